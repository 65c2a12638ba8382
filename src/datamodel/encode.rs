// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode-side data model.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::accessor::{Accessor, DATA_VARIABLE};
use super::{order_members, Precision};
use crate::core::{CodecConfig, CodecError, Result};
use crate::mapping::{
    FormatterRegistry, LoadContext, PropertyMetadataLoader, ServiceLocator, DATE_TIME_TO_STRING,
};
use crate::schema::{ClassRegistry, ScalarKind, TypeDescriptor};

/// Node of an encode graph. Each node knows where its value is read from.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeNode {
    /// Scalar, enum case or date-time
    Scalar {
        ty: TypeDescriptor,
        accessor: Accessor,
    },

    /// Union members, most specific first
    Composite {
        accessor: Accessor,
        members: Vec<EncodeNode>,
    },

    /// List or dict; `item` reads from `item_variable`
    Collection {
        ty: TypeDescriptor,
        accessor: Accessor,
        item_variable: String,
        item: Box<EncodeNode>,
    },

    /// Class instance, properties keyed by wire name
    Object {
        ty: TypeDescriptor,
        accessor: Accessor,
        properties: IndexMap<String, EncodeNode>,
        /// Whether the output differs from the instance's own properties
        transformed: bool,
    },
}

impl EncodeNode {
    pub fn accessor(&self) -> &Accessor {
        match self {
            EncodeNode::Scalar { accessor, .. }
            | EncodeNode::Composite { accessor, .. }
            | EncodeNode::Collection { accessor, .. }
            | EncodeNode::Object { accessor, .. } => accessor,
        }
    }

    pub fn ty(&self) -> TypeDescriptor {
        match self {
            EncodeNode::Scalar { ty, .. }
            | EncodeNode::Collection { ty, .. }
            | EncodeNode::Object { ty, .. } => ty.clone(),
            EncodeNode::Composite { members, .. } => {
                TypeDescriptor::union(members.iter().map(EncodeNode::ty))
            }
        }
    }

    fn precision(&self) -> Option<Precision> {
        match self {
            EncodeNode::Scalar { .. } => Some(Precision::Scalar),
            EncodeNode::Object { .. } => Some(Precision::Object),
            EncodeNode::Collection { .. } => Some(Precision::Collection),
            EncodeNode::Composite { .. } => None,
        }
    }

    /// Whether generic JSON encoding of the value gives the right output.
    pub fn only_needs_encode(&self) -> bool {
        match self {
            EncodeNode::Composite { members, .. } => members.iter().all(EncodeNode::only_needs_encode),
            EncodeNode::Collection { item, .. } => item.only_needs_encode(),
            EncodeNode::Object {
                properties,
                transformed,
                ..
            } => !transformed && properties.values().all(EncodeNode::only_needs_encode),
            EncodeNode::Scalar { ty, .. } => !matches!(
                ty,
                TypeDescriptor::BackedEnum { .. } | TypeDescriptor::Scalar(ScalarKind::Null)
            ) && !ty.is_date_time(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct BuildContext {
    depth_counters: HashMap<String, usize>,
    variable_counters: HashMap<String, usize>,
}

impl BuildContext {
    fn scope_variable(&mut self, name: &str) -> String {
        let counter = self.variable_counters.entry(name.to_string()).or_insert(0);
        let scoped = format!("{name}_{counter}");
        *counter += 1;
        scoped
    }
}

/// Builds encode graphs from type descriptors.
pub struct EncodeDataModelBuilder<'b> {
    loader: &'b dyn PropertyMetadataLoader,
    classes: &'b ClassRegistry,
    formatters: &'b FormatterRegistry,
    services: &'b dyn ServiceLocator,
}

impl<'b> EncodeDataModelBuilder<'b> {
    pub fn new(
        loader: &'b dyn PropertyMetadataLoader,
        classes: &'b ClassRegistry,
        formatters: &'b FormatterRegistry,
        services: &'b dyn ServiceLocator,
    ) -> Self {
        Self {
            loader,
            classes,
            formatters,
            services,
        }
    }

    /// Build the graph for a root value bound to `data`.
    pub fn build(&self, ty: &TypeDescriptor, config: &CodecConfig) -> Result<EncodeNode> {
        self.build_node(
            ty,
            Accessor::variable(DATA_VARIABLE),
            config,
            BuildContext::default(),
        )
    }

    fn build_node(
        &self,
        ty: &TypeDescriptor,
        accessor: Accessor,
        config: &CodecConfig,
        mut context: BuildContext,
    ) -> Result<EncodeNode> {
        match ty {
            TypeDescriptor::Union(members) => {
                let members = members
                    .iter()
                    .map(|m| self.build_node(m, accessor.clone(), config, context.clone()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(EncodeNode::Composite {
                    accessor,
                    members: order_members(members, EncodeNode::precision)?,
                })
            }

            TypeDescriptor::Scalar(_) | TypeDescriptor::BackedEnum { .. } => Ok(EncodeNode::Scalar {
                ty: ty.clone(),
                accessor,
            }),

            TypeDescriptor::Object { .. } if ty.is_date_time() => {
                let formatter = self.formatters.get(DATE_TIME_TO_STRING)?;
                Ok(EncodeNode::Scalar {
                    ty: ty.clone(),
                    accessor: accessor.format(&formatter, self.services)?,
                })
            }

            TypeDescriptor::Object { class, .. } => {
                let depth = context.depth_counters.entry(class.clone()).or_insert(0);
                *depth += 1;
                if *depth > config.max_depth {
                    return Err(CodecError::max_depth(class, config.max_depth));
                }

                let load_context = LoadContext {
                    original_type: ty.clone(),
                    depth_counters: context.depth_counters.clone(),
                };
                let metadata = self.loader.load(class, config, &load_context)?;
                let definition = self.classes.class(class)?;

                let mut transformed = !metadata
                    .values()
                    .map(|m| m.local_name())
                    .eq(definition.property_names());

                let mut properties = IndexMap::with_capacity(metadata.len());
                for (wire_name, property) in metadata {
                    if wire_name != property.local_name() || !property.formatters().is_empty() {
                        transformed = true;
                    }

                    let property_accessor = accessor
                        .clone()
                        .property(property.local_name())
                        .format_chain(property.formatters(), self.formatters, self.services)?;
                    let node =
                        self.build_node(property.ty(), property_accessor, config, context.clone())?;
                    properties.insert(wire_name, node);
                }

                Ok(EncodeNode::Object {
                    ty: ty.clone(),
                    accessor,
                    properties,
                    transformed,
                })
            }

            TypeDescriptor::Collection { value, .. } => {
                let item_variable = context.scope_variable("value");
                let item = self.build_node(
                    value,
                    Accessor::variable(&item_variable),
                    config,
                    context,
                )?;
                Ok(EncodeNode::Collection {
                    ty: ty.clone(),
                    accessor,
                    item_variable,
                    item: Box::new(item),
                })
            }

            TypeDescriptor::Template(_) => Err(CodecError::unsupported_type(ty.to_string())),
        }
    }
}
