// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lowering of encode graphs into plans.

use std::collections::HashMap;

use super::{BranchArm, EncodeOp, EncodePlan, Fragment};
use crate::core::{CodecError, Mode, Result};
use crate::datamodel::{Accessor, EncodeNode};
use crate::encoding::guard::Guard;
use crate::schema::{ScalarKind, TypeDescriptor};

/// Turns an [`EncodeNode`] tree into an [`EncodePlan`] for one mode.
#[derive(Debug, Clone, Copy)]
pub struct EncodePlanBuilder {
    mode: Mode,
}

#[derive(Debug, Clone, Default)]
struct Context {
    variable_counters: HashMap<String, usize>,
}

impl Context {
    fn scope_variable(&mut self, name: &str) -> String {
        let counter = self.variable_counters.entry(name.to_string()).or_insert(0);
        let scoped = format!("{name}_{counter}");
        *counter += 1;
        scoped
    }
}

impl EncodePlanBuilder {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn build(&self, node: &EncodeNode, type_signature: &str) -> Result<EncodePlan> {
        let ops = self.build_ops(node, Context::default())?;
        Ok(EncodePlan::new(self.mode, type_signature, ops))
    }

    fn emit(&self, fragment: Fragment) -> EncodeOp {
        EncodeOp::emit(self.mode, fragment)
    }

    fn literal(&self, text: impl Into<String>) -> EncodeOp {
        self.emit(Fragment::Literal(text.into()))
    }

    fn build_ops(&self, node: &EncodeNode, mut context: Context) -> Result<Vec<EncodeOp>> {
        let accessor = node.accessor();

        if node.only_needs_encode() {
            return Ok(vec![self.emit(Fragment::Json(accessor.clone()))]);
        }

        match node {
            EncodeNode::Scalar { ty, accessor } => Ok(vec![match ty {
                TypeDescriptor::BackedEnum { .. } => {
                    self.emit(Fragment::Json(accessor.clone().property("value")))
                }
                TypeDescriptor::Scalar(ScalarKind::Null) => self.literal("null"),
                _ => self.emit(Fragment::Json(accessor.clone())),
            }]),

            EncodeNode::Composite { accessor, members } => {
                let arms = members
                    .iter()
                    .map(|member| {
                        Ok(BranchArm {
                            guard: Guard::of(&member.ty())?,
                            body: self.build_ops(member, context.clone())?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(vec![EncodeOp::Branch {
                    subject: accessor.clone(),
                    arms,
                }])
            }

            EncodeNode::Collection {
                ty,
                accessor,
                item_variable,
                item,
            } => {
                let is_list = matches!(ty, TypeDescriptor::Collection { is_list: true, .. });
                let prefix = context.scope_variable("prefix");
                let key = if is_list {
                    None
                } else {
                    Some(context.scope_variable("key"))
                };

                let mut body = vec![self.emit(Fragment::Text(Accessor::variable(&prefix)))];
                if let Some(key) = &key {
                    body.push(self.emit(Fragment::Json(Accessor::variable(key))));
                    body.push(self.literal(":"));
                }
                body.extend(self.build_ops(item, context)?);
                body.push(EncodeOp::Let {
                    name: prefix.clone(),
                    value: Accessor::Literal(",".into()),
                });

                let (open, close) = if is_list { ("[", "]") } else { ("{", "}") };
                Ok(vec![
                    self.literal(open),
                    EncodeOp::Let {
                        name: prefix,
                        value: Accessor::Literal("".into()),
                    },
                    EncodeOp::ForEach {
                        subject: accessor.clone(),
                        key,
                        item: item_variable.clone(),
                        body,
                    },
                    self.literal(close),
                ])
            }

            EncodeNode::Object { properties, .. } => {
                let mut ops = vec![self.literal("{")];
                let mut separator = "";
                for (name, property) in properties {
                    let encoded = serde_json::to_string(name)?;
                    let escaped = encoded
                        .strip_prefix('"')
                        .and_then(|s| s.strip_suffix('"'))
                        .ok_or_else(|| CodecError::Other(format!("cannot encode \"{name}\"")))?;

                    ops.push(self.literal(separator));
                    ops.push(self.literal("\""));
                    ops.push(self.literal(escaped));
                    ops.push(self.literal("\":"));
                    ops.extend(self.build_ops(property, context.clone())?);
                    separator = ",";
                }
                ops.push(self.literal("}"));
                Ok(ops)
            }
        }
    }
}
