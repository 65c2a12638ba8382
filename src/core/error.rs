// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for jsoncodec.
//!
//! Every failure is surfaced to the caller as a typed [`CodecError`]:
//! - Plan-build failures (unsupported types, depth, configuration)
//! - Stream validation while lexing or splitting JSON
//! - Value mismatches while decoding into typed objects
//! - Plan cache I/O

use thiserror::Error;

/// Errors that can occur while building or executing encode/decode plans.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Type shape the data model builders cannot traverse
    #[error("Unsupported type: \"{type_name}\"")]
    UnsupportedType {
        /// Canonical form of the type
        type_name: String,
    },

    /// Malformed JSON input
    #[error("Invalid JSON stream at offset {offset}: {reason}")]
    InvalidStream {
        /// Absolute byte offset where validation failed
        offset: u64,
        /// What went wrong
        reason: String,
    },

    /// Decoded value does not satisfy a property's declared type
    #[error("Cannot assign {actual} to property \"{class}::{property}\" of type \"{expected}\"")]
    ValueMismatch {
        /// Owning class
        class: String,
        /// Property local name
        property: String,
        /// Declared type
        expected: String,
        /// Kind of the value that was produced
        actual: String,
    },

    /// Runtime value that no plan branch accepts
    #[error("{message}")]
    UnexpectedValue {
        /// Error message
        message: String,
    },

    /// Object graph nests deeper than the configured limit
    #[error("Max depth of {limit} has been reached for class \"{class}\"")]
    MaxDepth {
        /// Class whose depth counter overflowed
        class: String,
        /// Configured limit
        limit: usize,
    },

    /// Formatter, class or generic declaration that cannot be used
    #[error("Invalid configuration for \"{subject}\": {message}")]
    Configuration {
        /// Formatter or class the problem is attributed to
        subject: String,
        /// Error message
        message: String,
    },

    /// Plan cache read/write failure
    #[error("I/O error in {context}: {message}")]
    Io {
        /// Operation that failed
        context: String,
        /// Underlying error
        message: String,
    },

    /// Parse error in a type signature, schema or JSON document
    #[error("Parse error in {context}: {message}")]
    Parse {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl CodecError {
    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        CodecError::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create a stream validation error.
    pub fn invalid_stream(offset: u64, reason: impl Into<String>) -> Self {
        CodecError::InvalidStream {
            offset,
            reason: reason.into(),
        }
    }

    /// Create a value mismatch error attributed to a property.
    pub fn value_mismatch(
        class: impl Into<String>,
        property: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        CodecError::ValueMismatch {
            class: class.into(),
            property: property.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unexpected value error.
    pub fn unexpected_value(message: impl Into<String>) -> Self {
        CodecError::UnexpectedValue {
            message: message.into(),
        }
    }

    /// Create a max depth error.
    pub fn max_depth(class: impl Into<String>, limit: usize) -> Self {
        CodecError::MaxDepth {
            class: class.into(),
            limit,
        }
    }

    /// Create a configuration error.
    pub fn configuration(subject: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Configuration {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Io {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an "unknown class" error.
    pub fn unknown_class(class: impl Into<String>) -> Self {
        let class = class.into();
        CodecError::Configuration {
            message: format!("class \"{class}\" is not registered"),
            subject: class,
        }
    }

    /// Whether this error comes from malformed JSON input.
    pub fn is_stream_error(&self) -> bool {
        matches!(self, CodecError::InvalidStream { .. })
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::UnsupportedType { type_name } => vec![("type", type_name.clone())],
            CodecError::InvalidStream { offset, reason } => {
                vec![("offset", offset.to_string()), ("reason", reason.clone())]
            }
            CodecError::ValueMismatch {
                class,
                property,
                expected,
                actual,
            } => vec![
                ("class", class.clone()),
                ("property", property.clone()),
                ("expected", expected.clone()),
                ("actual", actual.clone()),
            ],
            CodecError::UnexpectedValue { message } => vec![("message", message.clone())],
            CodecError::MaxDepth { class, limit } => {
                vec![("class", class.clone()), ("limit", limit.to_string())]
            }
            CodecError::Configuration { subject, message } => {
                vec![("subject", subject.clone()), ("message", message.clone())]
            }
            CodecError::Io { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::Parse { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io {
            context: "stream".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Parse {
            context: "json".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for jsoncodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
