// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! A single stored key/value pair.

/// An owned key/value pair held by a `Store`.
///
/// Both `key` and `value` are owned byte strings; there is no shared
/// ownership or borrowing back into the `Store`'s backing array, so a
/// caller holding an `Entry` (or a clone of its fields) is unaffected by
/// later mutation of the `Store` it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Entry {
    pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self { key, value }
    }
}
