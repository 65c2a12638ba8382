// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Template substitution for generic classes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{CodecConfig, CodecError, Result};
use crate::mapping::metadata::{LoadContext, PropertyMap, PropertyMetadataLoader};
use crate::schema::{ClassRegistry, TypeDescriptor};

/// Replaces template variables with the generic arguments of the type being
/// expanded, e.g. `T` becomes `int` when loading `Box<int>`.
pub struct GenericPropertyMetadataLoader {
    inner: Box<dyn PropertyMetadataLoader>,
    classes: Arc<ClassRegistry>,
}

impl GenericPropertyMetadataLoader {
    pub fn new(inner: Box<dyn PropertyMetadataLoader>, classes: Arc<ClassRegistry>) -> Self {
        Self { inner, classes }
    }

    fn bindings(&self, class: &str, original: &TypeDescriptor) -> Result<HashMap<String, TypeDescriptor>> {
        let Some(TypeDescriptor::Object { generics, .. }) = original.find_object(class) else {
            return Ok(HashMap::new());
        };

        let definition = self.classes.class(class)?;
        if definition.templates.len() != generics.len() {
            return Err(CodecError::configuration(
                class,
                format!(
                    "Given {} generic parameters in \"{original}\", but {} templates are defined in \"{class}\".",
                    generics.len(),
                    definition.templates.len()
                ),
            ));
        }

        Ok(definition
            .templates
            .iter()
            .cloned()
            .zip(generics.iter().cloned())
            .collect())
    }
}

impl PropertyMetadataLoader for GenericPropertyMetadataLoader {
    fn load(&self, class: &str, config: &CodecConfig, context: &LoadContext) -> Result<PropertyMap> {
        let mut result = self.inner.load(class, config, context)?;
        let bindings = self.bindings(class, &context.original_type)?;
        if bindings.is_empty() {
            return Ok(result);
        }

        for metadata in result.values_mut() {
            let ty = metadata.ty().substitute(&bindings);
            if &ty != metadata.ty() {
                *metadata = metadata.with_type(ty);
            }
        }

        Ok(result)
    }
}
