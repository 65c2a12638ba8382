// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Property metadata pipeline.
//!
//! - [`metadata`] - Property metadata, load context and the loader trait
//! - [`attribute`] - Renames, formatters and max-depth policy
//! - [`date_time`] - `DateTime` to string retyping
//! - [`generic`] - Template substitution for generic classes
//! - [`formatter`] - Named formatter functions
//! - [`services`] - Runtime lookup of formatter arguments

pub mod attribute;
pub mod date_time;
pub mod formatter;
pub mod generic;
pub mod metadata;
pub mod services;

use std::sync::Arc;

pub use attribute::{DecodeAttributePropertyMetadataLoader, EncodeAttributePropertyMetadataLoader};
pub use date_time::{DateTimePropertyMetadataLoader, Direction};
pub use formatter::{
    Formatter, FormatterFn, FormatterRegistry, CONFIG_PARAMETER, DATE_TIME_FROM_STRING,
    DATE_TIME_TO_STRING,
};
pub use generic::GenericPropertyMetadataLoader;
pub use metadata::{
    ClassPropertyMetadataLoader, LoadContext, PropertyMap, PropertyMetadata,
    PropertyMetadataLoader,
};
pub use services::{ServiceLocator, ServiceMap};

use crate::schema::ClassRegistry;

/// Encode chain: attributes over date-time over generic over declarations.
///
/// Template substitution runs first so a template bound to `DateTime` is
/// retyped too, and annotations run last so a user formatter on a date-time
/// property receives the string form.
pub fn default_encode_loader(
    classes: Arc<ClassRegistry>,
    formatters: Arc<FormatterRegistry>,
) -> Box<dyn PropertyMetadataLoader> {
    let base = ClassPropertyMetadataLoader::new(classes.clone());
    let generic = GenericPropertyMetadataLoader::new(Box::new(base), classes.clone());
    let date_time = DateTimePropertyMetadataLoader::new(Box::new(generic), Direction::Encode);
    Box::new(EncodeAttributePropertyMetadataLoader::new(
        Box::new(date_time),
        classes,
        formatters,
    ))
}

/// Decode chain, stacked like the encode chain.
pub fn default_decode_loader(
    classes: Arc<ClassRegistry>,
    formatters: Arc<FormatterRegistry>,
) -> Box<dyn PropertyMetadataLoader> {
    let base = ClassPropertyMetadataLoader::new(classes.clone());
    let generic = GenericPropertyMetadataLoader::new(Box::new(base), classes.clone());
    let date_time = DateTimePropertyMetadataLoader::new(Box::new(generic), Direction::Decode);
    Box::new(DecodeAttributePropertyMetadataLoader::new(
        Box::new(date_time),
        classes,
        formatters,
    ))
}
