// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Date-time retyping.
//!
//! JSON has no date-time type, so `DateTime` properties travel as strings.
//! This loader swaps `DateTime` (and `DateTime|null`) for `string`
//! (and `string|null`) and appends the matching builtin formatter.

use crate::core::{CodecConfig, Result};
use crate::mapping::formatter::{DATE_TIME_FROM_STRING, DATE_TIME_TO_STRING};
use crate::mapping::metadata::{LoadContext, PropertyMap, PropertyMetadataLoader};
use crate::schema::TypeDescriptor;

/// Which way values flow through the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    fn formatter(&self) -> &'static str {
        match self {
            Direction::Encode => DATE_TIME_TO_STRING,
            Direction::Decode => DATE_TIME_FROM_STRING,
        }
    }
}

pub struct DateTimePropertyMetadataLoader {
    inner: Box<dyn PropertyMetadataLoader>,
    direction: Direction,
}

impl DateTimePropertyMetadataLoader {
    pub fn new(inner: Box<dyn PropertyMetadataLoader>, direction: Direction) -> Self {
        Self { inner, direction }
    }
}

/// String counterpart of a date-time type, if the type is one.
fn string_form(ty: &TypeDescriptor) -> Option<TypeDescriptor> {
    if ty.is_date_time() {
        return Some(TypeDescriptor::string());
    }
    match ty.non_null_member() {
        Some(inner) if inner.is_date_time() => {
            Some(TypeDescriptor::nullable(TypeDescriptor::string()))
        }
        _ => None,
    }
}

impl PropertyMetadataLoader for DateTimePropertyMetadataLoader {
    fn load(&self, class: &str, config: &CodecConfig, context: &LoadContext) -> Result<PropertyMap> {
        let mut result = self.inner.load(class, config, context)?;

        for metadata in result.values_mut() {
            if let Some(ty) = string_form(metadata.ty()) {
                *metadata = metadata
                    .with_type(ty)
                    .with_formatter(self.direction.formatter());
            }
        }

        Ok(result)
    }
}
