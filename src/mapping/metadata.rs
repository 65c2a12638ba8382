// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Property metadata and the loader pipeline.
//!
//! A [`PropertyMetadataLoader`] returns, for one class, the ordered mapping
//! from wire name to [`PropertyMetadata`]. Loaders are decorators: each one
//! wraps an inner loader and may rename, retype or attach formatters to what
//! the inner one returned. [`ClassPropertyMetadataLoader`] sits at the bottom
//! and reads declarations from the [`ClassRegistry`].

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::{CodecConfig, Result};
use crate::schema::{ClassRegistry, TypeDescriptor};

/// How one property is read and written.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMetadata {
    local_name: String,
    wire_name: String,
    ty: TypeDescriptor,
    formatters: Vec<String>,
    max_depth: Option<usize>,
    max_depth_fallback: Option<String>,
}

impl PropertyMetadata {
    pub fn new(local_name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let local_name = local_name.into();
        Self {
            wire_name: local_name.clone(),
            local_name,
            ty,
            formatters: Vec::new(),
            max_depth: None,
            max_depth_fallback: None,
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Formatter names, applied in order.
    pub fn formatters(&self) -> &[String] {
        &self.formatters
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn max_depth_fallback(&self) -> Option<&str> {
        self.max_depth_fallback.as_deref()
    }

    /// Copy with another wire name.
    pub fn with_name(&self, wire_name: impl Into<String>) -> Self {
        Self {
            wire_name: wire_name.into(),
            ..self.clone()
        }
    }

    /// Copy with another type.
    pub fn with_type(&self, ty: TypeDescriptor) -> Self {
        Self {
            ty,
            ..self.clone()
        }
    }

    /// Copy with a formatter appended to the chain.
    pub fn with_formatter(&self, formatter: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.formatters.push(formatter.into());
        copy
    }

    /// Copy with a formatter run ahead of the existing chain.
    pub fn with_leading_formatter(&self, formatter: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.formatters.insert(0, formatter.into());
        copy
    }

    /// Copy with a max-depth policy.
    pub fn with_max_depth(&self, limit: usize, fallback: Option<String>) -> Self {
        Self {
            max_depth: Some(limit),
            max_depth_fallback: fallback,
            ..self.clone()
        }
    }
}

/// Build state handed to loaders.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Type whose expansion triggered the load; generic arguments come from it
    pub original_type: TypeDescriptor,
    /// Per-class nesting counters along the current encode path
    pub depth_counters: HashMap<String, usize>,
}

impl LoadContext {
    pub fn new(original_type: TypeDescriptor) -> Self {
        Self {
            original_type,
            depth_counters: HashMap::new(),
        }
    }

    pub fn depth(&self, class: &str) -> usize {
        self.depth_counters.get(class).copied().unwrap_or(0)
    }
}

/// Ordered wire name to metadata mapping.
pub type PropertyMap = IndexMap<String, PropertyMetadata>;

/// Source of property metadata for a class.
pub trait PropertyMetadataLoader: Send + Sync {
    fn load(&self, class: &str, config: &CodecConfig, context: &LoadContext)
        -> Result<PropertyMap>;
}

/// Reads declared properties, in declaration order.
pub struct ClassPropertyMetadataLoader {
    classes: Arc<ClassRegistry>,
}

impl ClassPropertyMetadataLoader {
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self { classes }
    }
}

impl PropertyMetadataLoader for ClassPropertyMetadataLoader {
    fn load(
        &self,
        class: &str,
        _config: &CodecConfig,
        _context: &LoadContext,
    ) -> Result<PropertyMap> {
        let definition = self.classes.class(class)?;

        Ok(definition
            .properties
            .iter()
            .map(|property| {
                let mut metadata =
                    PropertyMetadata::new(&property.name, property.resolved_type().clone());
                if let Some(max_depth) = &property.max_depth {
                    metadata = metadata.with_max_depth(max_depth.limit, max_depth.fallback.clone());
                }
                (property.name.clone(), metadata)
            })
            .collect())
    }
}
