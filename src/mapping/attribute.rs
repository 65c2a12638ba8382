// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Loaders applying per-property annotations.
//!
//! Encoded names rename a property on the wire. Encode formatters retype the
//! property to the formatter output and run last, after any builtin
//! conversion. Decode formatters retype it to the formatter input, since the
//! wire carries what the formatter consumes, and run first on the raw value.
//! On the encode side, a property whose max depth is below the owning class's
//! current nesting is swapped for its fallback formatter, or dropped.

use std::sync::Arc;

use crate::core::{CodecConfig, Result};
use crate::mapping::formatter::FormatterRegistry;
use crate::mapping::metadata::{LoadContext, PropertyMap, PropertyMetadataLoader};
use crate::schema::ClassRegistry;

/// Encode-side annotation loader.
pub struct EncodeAttributePropertyMetadataLoader {
    inner: Box<dyn PropertyMetadataLoader>,
    classes: Arc<ClassRegistry>,
    formatters: Arc<FormatterRegistry>,
}

impl EncodeAttributePropertyMetadataLoader {
    pub fn new(
        inner: Box<dyn PropertyMetadataLoader>,
        classes: Arc<ClassRegistry>,
        formatters: Arc<FormatterRegistry>,
    ) -> Self {
        Self {
            inner,
            classes,
            formatters,
        }
    }
}

impl PropertyMetadataLoader for EncodeAttributePropertyMetadataLoader {
    fn load(&self, class: &str, config: &CodecConfig, context: &LoadContext) -> Result<PropertyMap> {
        let initial = self.inner.load(class, config, context)?;
        let definition = self.classes.class(class)?;
        let depth = context.depth(class);

        let mut result = PropertyMap::with_capacity(initial.len());
        for (wire_name, metadata) in initial {
            let Some(property) = definition.get_property(metadata.local_name()) else {
                result.insert(wire_name, metadata);
                continue;
            };

            let (wire_name, mut metadata) = match &property.encoded_name {
                Some(name) => (name.clone(), metadata.with_name(name)),
                None => (wire_name, metadata),
            };

            if let Some(limit) = metadata.max_depth() {
                if depth > limit {
                    let Some(fallback) = metadata.max_depth_fallback().map(str::to_string) else {
                        tracing::debug!(class, property = %property.name, depth, limit, "dropping property past max depth");
                        continue;
                    };
                    let formatter = self.formatters.get(&fallback)?;
                    metadata = metadata
                        .with_type(formatter.output().clone())
                        .with_formatter(fallback);
                    result.insert(wire_name, metadata);
                    continue;
                }
            }

            if let Some(name) = &property.encode_formatter {
                let formatter = self.formatters.get(name)?;
                metadata = metadata
                    .with_type(formatter.output().clone())
                    .with_formatter(name);
            }

            result.insert(wire_name, metadata);
        }

        Ok(result)
    }
}

/// Decode-side annotation loader.
pub struct DecodeAttributePropertyMetadataLoader {
    inner: Box<dyn PropertyMetadataLoader>,
    classes: Arc<ClassRegistry>,
    formatters: Arc<FormatterRegistry>,
}

impl DecodeAttributePropertyMetadataLoader {
    pub fn new(
        inner: Box<dyn PropertyMetadataLoader>,
        classes: Arc<ClassRegistry>,
        formatters: Arc<FormatterRegistry>,
    ) -> Self {
        Self {
            inner,
            classes,
            formatters,
        }
    }
}

impl PropertyMetadataLoader for DecodeAttributePropertyMetadataLoader {
    fn load(&self, class: &str, config: &CodecConfig, context: &LoadContext) -> Result<PropertyMap> {
        let initial = self.inner.load(class, config, context)?;
        let definition = self.classes.class(class)?;

        let mut result = PropertyMap::with_capacity(initial.len());
        for (wire_name, metadata) in initial {
            let Some(property) = definition.get_property(metadata.local_name()) else {
                result.insert(wire_name, metadata);
                continue;
            };

            let (wire_name, mut metadata) = match &property.encoded_name {
                Some(name) => (name.clone(), metadata.with_name(name)),
                None => (wire_name, metadata),
            };

            if let Some(name) = &property.decode_formatter {
                let formatter = self.formatters.get(name)?;
                metadata = metadata
                    .with_type(formatter.input().clone())
                    .with_leading_formatter(name);
            }

            result.insert(wire_name, metadata);
        }

        Ok(result)
    }
}
