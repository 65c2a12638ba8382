// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode-side data model.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::accessor::{Accessor, RAW_VALUE};
use super::{order_members, Precision};
use crate::core::{CodecConfig, CodecError, Result};
use crate::mapping::{FormatterRegistry, LoadContext, PropertyMetadataLoader, ServiceLocator};
use crate::schema::TypeDescriptor;

/// One property of a decoded object.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeProperty {
    /// Name the value is stored under on the instance
    pub local_name: String,
    pub node: DecodeNode,
    /// How the instance value is computed from the raw decoded one
    pub value: Accessor,
}

/// Node of a decode graph.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeNode {
    Scalar {
        ty: TypeDescriptor,
    },

    /// Union members, most specific first
    Composite {
        members: Vec<DecodeNode>,
    },

    Collection {
        ty: TypeDescriptor,
        item: Box<DecodeNode>,
    },

    /// Class instance, properties keyed by wire name. A ghost stands for a
    /// type already being expanded higher up the same path.
    Object {
        ty: TypeDescriptor,
        properties: IndexMap<String, DecodeProperty>,
        ghost: bool,
    },
}

impl DecodeNode {
    pub fn ty(&self) -> TypeDescriptor {
        match self {
            DecodeNode::Scalar { ty }
            | DecodeNode::Collection { ty, .. }
            | DecodeNode::Object { ty, .. } => ty.clone(),
            DecodeNode::Composite { members } => {
                TypeDescriptor::union(members.iter().map(DecodeNode::ty))
            }
        }
    }

    /// Identity used to share generated providers.
    pub fn identifier(&self) -> String {
        self.ty().to_string()
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self, DecodeNode::Object { ghost: true, .. })
    }

    fn precision(&self) -> Option<Precision> {
        match self {
            DecodeNode::Scalar { .. } => Some(Precision::Scalar),
            DecodeNode::Object { .. } => Some(Precision::Object),
            DecodeNode::Collection { .. } => Some(Precision::Collection),
            DecodeNode::Composite { .. } => None,
        }
    }
}

/// Builds decode graphs from type descriptors.
pub struct DecodeDataModelBuilder<'b> {
    loader: &'b dyn PropertyMetadataLoader,
    formatters: &'b FormatterRegistry,
    services: &'b dyn ServiceLocator,
}

impl<'b> DecodeDataModelBuilder<'b> {
    pub fn new(
        loader: &'b dyn PropertyMetadataLoader,
        formatters: &'b FormatterRegistry,
        services: &'b dyn ServiceLocator,
    ) -> Self {
        Self {
            loader,
            formatters,
            services,
        }
    }

    pub fn build(&self, ty: &TypeDescriptor, config: &CodecConfig) -> Result<DecodeNode> {
        self.build_node(ty, config, HashSet::new())
    }

    fn build_node(
        &self,
        ty: &TypeDescriptor,
        config: &CodecConfig,
        mut generated: HashSet<String>,
    ) -> Result<DecodeNode> {
        match ty {
            TypeDescriptor::Union(members) => {
                let members = members
                    .iter()
                    .map(|m| self.build_node(m, config, generated.clone()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(DecodeNode::Composite {
                    members: order_members(members, DecodeNode::precision)?,
                })
            }

            TypeDescriptor::Scalar(_) | TypeDescriptor::BackedEnum { .. } => {
                Ok(DecodeNode::Scalar { ty: ty.clone() })
            }

            TypeDescriptor::Object { .. } if ty.is_date_time() => {
                Ok(DecodeNode::Scalar { ty: ty.clone() })
            }

            TypeDescriptor::Object { class, .. } => {
                if !generated.insert(ty.to_string()) {
                    return Ok(DecodeNode::Object {
                        ty: ty.clone(),
                        properties: IndexMap::new(),
                        ghost: true,
                    });
                }

                let context = LoadContext::new(ty.clone());
                let metadata = self.loader.load(class, config, &context)?;

                let mut properties = IndexMap::with_capacity(metadata.len());
                for (wire_name, property) in metadata {
                    let node = self.build_node(property.ty(), config, generated.clone())?;
                    let value = Accessor::Opaque(RAW_VALUE.to_string()).format_chain(
                        property.formatters(),
                        self.formatters,
                        self.services,
                    )?;
                    properties.insert(
                        wire_name,
                        DecodeProperty {
                            local_name: property.local_name().to_string(),
                            node,
                            value,
                        },
                    );
                }

                Ok(DecodeNode::Object {
                    ty: ty.clone(),
                    properties,
                    ghost: false,
                })
            }

            TypeDescriptor::Collection { value, .. } => Ok(DecodeNode::Collection {
                ty: ty.clone(),
                item: Box::new(self.build_node(value, config, generated)?),
            }),

            TypeDescriptor::Template(_) => Err(CodecError::unsupported_type(ty.to_string())),
        }
    }
}
