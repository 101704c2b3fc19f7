// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Error types for all pathkv operations.
//!
//! `NotFound` is intentionally absent here: a missing key on `get` is a
//! normal outcome represented by `Option`, not a failure (see `store::get`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard Result type for all pathkv operations.
pub type PathKvResult<T> = Result<T, PathKvError>;

/// Error kinds surfaced at the pathkv API boundary.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum PathKvError {
    /// A null/empty argument, or a key/value whose escaped length exceeds
    /// the configured `l_max`.
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// Allocation failure while growing the backing array.
    #[error("out of memory while {operation}")]
    OutOfMemory { operation: String },

    /// A malformed text-format document was loaded.
    #[error("syntax error at line {line}: {message}")]
    SyntaxError { line: u64, message: String },

    /// The underlying file could not be opened or closed.
    #[error("failed to open '{path}': {reason}")]
    OpenFailure { path: String, reason: String },

    /// Variable interpolation exceeded the configured maximum depth.
    #[error("interpolation recursion limit ({depth}) exceeded for '{path}'")]
    RecursionLimit { path: String, depth: u32 },

    /// A streaming write (one line) failed while saving.
    #[error("write error to '{path}': {reason}")]
    WriteError { path: String, reason: String },

    /// The final flush/close of the destination file failed.
    #[error("close error for '{path}': {reason}")]
    CloseError { path: String, reason: String },

    /// The configuration file could not be parsed.
    #[error("configuration error in '{component}': {reason}")]
    ConfigError { component: String, reason: String },
}

// == CONVENIENCE FUNCTIONS ==

/// Creates an `InvalidArgument` error.
pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> PathKvError {
    PathKvError::InvalidArgument {
        argument: argument.into(),
        reason: reason.into(),
    }
}

/// Creates an `OutOfMemory` error.
pub fn out_of_memory(operation: impl Into<String>) -> PathKvError {
    PathKvError::OutOfMemory {
        operation: operation.into(),
    }
}

/// Creates a `SyntaxError` error.
pub fn syntax_error(line: u64, message: impl Into<String>) -> PathKvError {
    PathKvError::SyntaxError {
        line,
        message: message.into(),
    }
}

/// Creates an `OpenFailure` error.
pub fn open_failure(path: impl Into<String>, reason: impl Into<String>) -> PathKvError {
    PathKvError::OpenFailure {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a `RecursionLimit` error.
pub fn recursion_limit(path: impl Into<String>, depth: u32) -> PathKvError {
    PathKvError::RecursionLimit {
        path: path.into(),
        depth,
    }
}

/// Creates a `WriteError` error.
pub fn write_error(path: impl Into<String>, reason: impl Into<String>) -> PathKvError {
    PathKvError::WriteError {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a `CloseError` error.
pub fn close_error(path: impl Into<String>, reason: impl Into<String>) -> PathKvError {
    PathKvError::CloseError {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a `ConfigError` error.
pub fn config_error(component: impl Into<String>, reason: impl Into<String>) -> PathKvError {
    PathKvError::ConfigError {
        component: component.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convenience_constructors_round_trip_fields() {
        let e = invalid_argument("key", "too long");
        match e {
            PathKvError::InvalidArgument { argument, reason } => {
                assert_eq!(argument, "key");
                assert_eq!(reason, "too long");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn recursion_limit_carries_depth() {
        let e = recursion_limit("a::b", 25);
        match e {
            PathKvError::RecursionLimit { depth, .. } => assert_eq!(depth, 25),
            _ => panic!("wrong variant"),
        }
    }
}
