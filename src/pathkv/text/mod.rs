// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! The text-format subsystem: shared escaping, the state-machine reader,
//! and the sorted-order writer.

pub mod emitter;
pub mod escape;
pub mod parser;
