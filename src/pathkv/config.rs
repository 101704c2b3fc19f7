// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! pathkv.toml configuration system.
//!
//! Fixes the tunables that the original store treats as hard constants
//! (`L_max`, `MAX_DEPTH`, `MIN_CAPACITY`) and the default behaviour of
//! `save` and the diagnostics stream. Every field defaults to exactly the
//! constant it stands in for, and the file itself is optional — an absent
//! or empty `pathkv.toml` produces identical behaviour to the hard-coded
//! original.

use crate::pathkv::error::{config_error, PathKvError, PathKvResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete pathkv.toml configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathKvConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Size and recursion limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimitsConfig {
    #[serde(default = "default_l_max")]
    pub l_max: usize,
    #[serde(default = "default_max_interp_depth")]
    pub max_interp_depth: u32,
    #[serde(default = "default_min_capacity")]
    pub min_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            l_max: default_l_max(),
            max_interp_depth: default_max_interp_depth(),
            min_capacity: default_min_capacity(),
        }
    }
}

/// Default `save` behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FormatConfig {
    #[serde(default)]
    pub align: bool,
    #[serde(default)]
    pub interpolate: bool,
}

/// Diagnostics stream behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub quiet: bool,
}

fn default_l_max() -> usize {
    1024
}
fn default_max_interp_depth() -> u32 {
    25
}
fn default_min_capacity() -> usize {
    16
}

impl Default for PathKvConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            format: FormatConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl PathKvConfig {
    /// Parses a pathkv.toml file from disk. A missing file is not an error
    /// here; callers that want "missing file means defaults" should check
    /// existence themselves and fall back to `PathKvConfig::default()`.
    ///
    /// ## Error Conditions
    /// - File cannot be read
    /// - TOML syntax error
    pub fn from_file<P: AsRef<Path>>(path: P) -> PathKvResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| PathKvError::OpenFailure {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from an in-memory TOML document. An empty or
    /// whitespace-only document yields `PathKvConfig::default()`.
    pub fn from_toml_str(content: &str) -> PathKvResult<Self> {
        toml::from_str(content).map_err(|e| config_error("pathkv.toml", e.to_string()))
    }

    pub fn quiet(&self) -> bool {
        self.diagnostics.quiet
    }
}

/// Writes a diagnostic to stderr unless `quiet` is set.
///
/// This is the crate's sole "logging" mechanism, matching the teacher's own
/// practice of plain `eprintln!` diagnostics rather than a logging crate —
/// there is no `log`/`tracing` dependency anywhere in this lineage. Gating
/// on an owned `quiet` flag (rather than a mutable global) is what makes
/// per-`Store` diagnostics safe to use from more than one `Store` in the
/// same process without cross-talk.
pub fn warn(quiet: bool, message: impl std::fmt::Display) {
    if !quiet {
        eprintln!("pathkv: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_matches_hard_coded_defaults() {
        let cfg = PathKvConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PathKvConfig::default());
        assert_eq!(cfg.limits.l_max, 1024);
        assert_eq!(cfg.limits.max_interp_depth, 25);
        assert_eq!(cfg.limits.min_capacity, 16);
        assert!(!cfg.format.align);
        assert!(!cfg.format.interpolate);
        assert!(!cfg.quiet());
    }

    #[test]
    fn partial_document_only_overrides_given_fields() {
        let cfg = PathKvConfig::from_toml_str("[limits]\nl_max = 64\n").unwrap();
        assert_eq!(cfg.limits.l_max, 64);
        assert_eq!(cfg.limits.max_interp_depth, 25);
        assert_eq!(cfg.limits.min_capacity, 16);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let result = PathKvConfig::from_toml_str("not = [valid");
        assert!(result.is_err());
    }
}
