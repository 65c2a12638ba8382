// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lowering of decode graphs into provider tables.

use indexmap::IndexMap;

use super::{DecodeArm, DecodePlan, PropertyStep, Provider};
use crate::core::{CodecError, Mode, Result};
use crate::datamodel::DecodeNode;
use crate::encoding::guard::Guard;
use crate::schema::TypeDescriptor;

/// Turns a [`DecodeNode`] graph into a [`DecodePlan`] for one mode.
#[derive(Debug, Clone, Copy)]
pub struct DecodePlanBuilder {
    mode: Mode,
}

impl DecodePlanBuilder {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn build(&self, node: &DecodeNode, type_signature: &str) -> Result<DecodePlan> {
        let mut providers = IndexMap::new();
        let root = self.provide(node, &mut providers)?;
        Ok(DecodePlan {
            mode: self.mode,
            type_signature: type_signature.to_string(),
            root,
            providers,
        })
    }

    /// Register the provider of `node` and its dependencies, returning its key.
    ///
    /// Dependencies are registered before the providers that use them, except
    /// for ghosts, whose provider is still being built further up.
    fn provide(
        &self,
        node: &DecodeNode,
        providers: &mut IndexMap<String, Provider>,
    ) -> Result<String> {
        let id = node.identifier();
        if node.is_ghost() || providers.contains_key(&id) {
            return Ok(id);
        }

        let provider = match node {
            DecodeNode::Scalar { ty } => Provider::Scalar { ty: ty.clone() },

            DecodeNode::Composite { members } => {
                let arms = members
                    .iter()
                    .map(|member| {
                        Ok(DecodeArm {
                            guard: Guard::of(&member.ty())?,
                            provider: self.provide(member, providers)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Provider::Composite { arms }
            }

            DecodeNode::Collection { ty, item } => {
                let TypeDescriptor::Collection { is_list, .. } = ty else {
                    return Err(CodecError::unsupported_type(ty.to_string()));
                };
                Provider::Collection {
                    is_list: *is_list,
                    item: self.provide(item, providers)?,
                    split: self.mode.is_streaming() && !matches!(**item, DecodeNode::Scalar { .. }),
                }
            }

            DecodeNode::Object { ty, properties, .. } => {
                let class = ty
                    .class_name()
                    .ok_or_else(|| CodecError::unsupported_type(ty.to_string()))?
                    .to_string();
                let properties = properties
                    .iter()
                    .map(|(wire_name, property)| {
                        Ok(PropertyStep {
                            wire_name: wire_name.clone(),
                            local_name: property.local_name.clone(),
                            provider: self.provide(&property.node, providers)?,
                            value: property.value.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Provider::Object { class, properties }
            }
        };

        providers.insert(id.clone(), provider);
        Ok(id)
    }
}
