// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout jsoncodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Typed error handling
//! - [`Value`] / [`Object`] - Host value model with deferred properties
//! - [`CodecConfig`] - Plan and formatter configuration
//! - [`TypeRegistry`] - Named registry used by class and formatter lookup
//! - [`Mode`] - I/O mode a plan is compiled for

pub mod config;
pub mod error;
pub mod registry;
pub mod value;

pub use config::{CodecConfig, DEFAULT_MAX_DEPTH};
pub use error::{CodecError, Result};
pub use registry::TypeRegistry;
pub use value::{BackingValue, EnumCase, Object, Thunk, Value};

use serde::{Deserialize, Serialize};

/// I/O mode a plan is compiled for.
///
/// Encoding: `String` yields buffered fragments, `Stream` pushes into a
/// [`crate::stream::StreamWriter`], `Resource` writes to a raw `io::Write`
/// handle. Decoding: `String` parses a whole buffer eagerly, `Stream` and
/// `Resource` read lazily from a [`crate::stream::JsonSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    String,
    Stream,
    Resource,
}

/// Error returned when parsing a `Mode` from string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseModeError {
    _private: (),
}

impl std::fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid mode name, expected 'string', 'stream', or 'resource'"
        )
    }
}

impl std::error::Error for ParseModeError {}

impl std::str::FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(Mode::String),
            "stream" => Ok(Mode::Stream),
            "resource" => Ok(Mode::Resource),
            _ => Err(ParseModeError { _private: () }),
        }
    }
}

impl Mode {
    /// Whether decoding in this mode reads lazily from a source.
    pub fn is_streaming(&self) -> bool {
        !matches!(self, Mode::String)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::String => "string",
            Mode::Stream => "stream",
            Mode::Resource => "resource",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
