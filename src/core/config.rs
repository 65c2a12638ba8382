// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec configuration.
//!
//! The same configuration drives plan building (`max_depth`,
//! `force_generation`) and is handed to formatters at run time as the
//! `config` argument, so unknown keys are preserved in [`CodecConfig::extra`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{CodecError, Result};
use super::value::Value;

/// Default object nesting limit for encoding.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration for plan generation and execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum number of nested expansions of one class while encoding
    pub max_depth: usize,
    /// chrono format string for date-times; RFC 3339 when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_format: Option<String>,
    /// Rebuild plans even when a cached one exists
    pub force_generation: bool,
    /// Additional keys made available to formatters
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            date_time_format: None,
            force_generation: false,
            extra: serde_json::Map::new(),
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_date_time_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = Some(format.into());
        self
    }

    pub fn with_force_generation(mut self, force: bool) -> Self {
        self.force_generation = force;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| CodecError::parse("config", e.to_string()))
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| CodecError::io(format!("reading {}", path.display()), e.to_string()))?;
        Self::from_toml_str(&source)
    }

    /// The configuration as a dict value, as formatters receive it.
    pub fn to_value(&self) -> Result<Value> {
        Ok(Value::from_json(serde_json::to_value(self)?))
    }
}
