// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # jsoncodec
//!
//! Type-directed JSON codec generator.
//!
//! Given the type of a value (scalar, backed enum, class instance,
//! collection or a union of these), jsoncodec builds a data model graph of
//! how to traverse it, compiles the graph into a plan specialized for that
//! exact type and I/O mode, caches the plan on disk and runs it.
//!
//! ## Architecture
//!
//! - `core/` - Errors, configuration and the host value model
//! - `schema/` - Type descriptors, their grammar and class declarations
//! - `mapping/` - Property metadata loaders, formatters and services
//! - `datamodel/` - Encode and decode graphs and the accessor algebra
//! - `encoding/` - Plan builders, optimizer, plan cache and the facades
//! - `stream/` - Streaming lexer, range splitter, sources and writers
//!
//! ## Example: Encoding
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use jsoncodec::{ClassRegistry, JsonEncoder, Object, Value, parse_type};
//!
//! let classes = Arc::new(ClassRegistry::from_file("schema.toml")?);
//! let encoder = JsonEncoder::create(classes, "/tmp/jsoncodec")?;
//!
//! let dummy = Value::Object(Object::new("Dummy", [("id", Value::Int(1))]));
//! let json = encoder.encode_to_string(&dummy, &parse_type("Dummy")?)?;
//! println!("{json}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Lazy decoding
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use jsoncodec::{ClassRegistry, JsonDecoder, parse_type};
//!
//! let classes = Arc::new(ClassRegistry::from_file("schema.toml")?);
//! let decoder = JsonDecoder::create(classes, "/tmp/jsoncodec")?;
//!
//! // Properties are read from the file when first accessed.
//! let value = decoder.decode_file("dummies.json", &parse_type("list<Dummy>")?)?;
//! for dummy in value.as_list().unwrap_or_default() {
//!     println!("{:?}", dummy.as_object().map(|o| o.get("id")));
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{
    BackingValue, CodecConfig, CodecError, EnumCase, Mode, Object, Result, Thunk, Value,
};

// Type descriptors and class declarations
pub mod schema;

pub use schema::{
    parse_type, ClassDefinition, ClassRegistry, EnumDefinition, PropertyDefinition, ScalarKind,
    TypeDescriptor,
};

// Property metadata pipeline
pub mod mapping;

pub use mapping::{
    Formatter, FormatterRegistry, PropertyMetadata, PropertyMetadataLoader, ServiceLocator,
    ServiceMap,
};

// Data model graphs
pub mod datamodel;

// Plans, cache and facades
pub mod encoding;

pub use encoding::{JsonDecoder, JsonEncoder, PlanCache};

// Streaming JSON
pub mod stream;

pub use stream::{FileSource, JsonSource, MemoryStream, StreamWriter};
