// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! pathkv - in-memory hierarchical key/value store with a line-oriented
//! text serialization format.

pub mod pathkv;

pub use pathkv::config::PathKvConfig;
pub use pathkv::error::{PathKvError, PathKvResult};
pub use pathkv::store::Store;
pub use pathkv::{hierarchy, interp, text};
