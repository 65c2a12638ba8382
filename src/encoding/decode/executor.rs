// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode plan execution.
//!
//! [`EagerDecoder`] walks a parsed `serde_json` document. [`StreamDecoder`]
//! works on byte ranges of a [`JsonSource`]: scalars and collections of
//! scalars are validated and parsed from their own range, containers of
//! anything else are split, and object properties become thunks that decode
//! their range on first read.

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use super::materializer::{EagerMaterializer, LazyMaterializer};
use super::{DecodePlan, Provider};
use crate::core::{BackingValue, CodecError, Result, Thunk, Value};
use crate::datamodel::{Accessor, Runtime, Scope, RAW_VALUE};
use crate::mapping::{FormatterRegistry, ServiceLocator, DATE_TIME_FROM_STRING};
use crate::schema::{ClassRegistry, ScalarKind, TypeDescriptor};
use crate::stream::{split_dict, split_list, JsonSource, Lexer};

/// Collaborators shared by every value of one decode call.
pub struct DecodeRuntime {
    /// Configuration handed to formatters
    pub config: Value,
    pub services: Rc<dyn ServiceLocator>,
    pub formatters: Arc<FormatterRegistry>,
    pub classes: Arc<ClassRegistry>,
}

impl DecodeRuntime {
    fn scope(&self) -> Scope<'_> {
        Scope::new(Runtime {
            config: &self.config,
            services: self.services.as_ref(),
            formatters: &self.formatters,
        })
    }

    /// Compute the instance value of a property from its raw decoded value.
    fn finish_property(&self, accessor: &Accessor, raw: Value) -> Result<Value> {
        if matches!(accessor, Accessor::Opaque(name) if name == RAW_VALUE) {
            return Ok(raw);
        }
        let mut scope = self.scope();
        scope.bind(RAW_VALUE, Cow::Owned(raw));
        Ok(scope.eval(accessor)?.into_owned())
    }

    /// Convert the JSON form of a scalar, enum or date-time.
    fn scalar(&self, ty: &TypeDescriptor, json: serde_json::Value) -> Result<Value> {
        match ty {
            TypeDescriptor::BackedEnum { enum_type, .. } => {
                let backing = match &json {
                    serde_json::Value::String(s) => BackingValue::String(s.clone()),
                    serde_json::Value::Number(n) if n.is_i64() => {
                        BackingValue::Int(n.as_i64().unwrap_or_default())
                    }
                    other => return Err(unexpected(other, ty)),
                };
                let definition = self.classes.enum_definition(enum_type)?;
                Ok(Value::Enum(definition.from_value(&backing)?))
            }
            TypeDescriptor::Scalar(ScalarKind::Float) => match json.as_f64() {
                Some(f) => Ok(Value::Float(f)),
                None => Ok(Value::from_json(json)),
            },
            TypeDescriptor::Object { .. } if ty.is_date_time() => self
                .formatters
                .get(DATE_TIME_FROM_STRING)?
                .call(&[Value::from_json(json), self.config.clone()]),
            _ => Ok(Value::from_json(json)),
        }
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_f64() => "float",
        serde_json::Value::Number(_) => "int",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "dict",
    }
}

fn unexpected(json: &serde_json::Value, ty: impl std::fmt::Display) -> CodecError {
    CodecError::unexpected_value(format!(
        "Unexpected \"{}\" value for \"{ty}\".",
        json_kind(json)
    ))
}

fn missing_provider(id: &str) -> CodecError {
    CodecError::Other(format!("decode plan has no provider \"{id}\""))
}

fn check_root(plan: &DecodePlan, value: Value) -> Result<Value> {
    if plan.root_type()?.accepts(&value) {
        Ok(value)
    } else {
        Err(CodecError::unexpected_value(format!(
            "Unexpected \"{}\" value for \"{}\".",
            value.kind_name(),
            plan.type_signature
        )))
    }
}

/// Decoder over a fully parsed document.
pub struct EagerDecoder<'p> {
    plan: &'p DecodePlan,
    runtime: &'p DecodeRuntime,
    materializer: EagerMaterializer,
}

impl<'p> EagerDecoder<'p> {
    pub fn new(plan: &'p DecodePlan, runtime: &'p DecodeRuntime) -> Self {
        Self {
            plan,
            runtime,
            materializer: EagerMaterializer::new(runtime.classes.clone()),
        }
    }

    /// Decode the root value.
    pub fn decode(&self, json: serde_json::Value) -> Result<Value> {
        let value = self.decode_provider(&self.plan.root, json)?;
        check_root(self.plan, value)
    }

    fn decode_provider(&self, id: &str, json: serde_json::Value) -> Result<Value> {
        let provider = self.plan.provider(id).ok_or_else(|| missing_provider(id))?;

        match provider {
            Provider::Scalar { ty } => self.runtime.scalar(ty, json),

            Provider::Composite { arms } => {
                let arm = arms
                    .iter()
                    .find(|arm| arm.guard.matches_json(&json))
                    .ok_or_else(|| unexpected(&json, id))?;
                self.decode_provider(&arm.provider, json)
            }

            Provider::Collection { is_list, item, .. } => match json {
                serde_json::Value::Array(items) if *is_list => Ok(Value::List(
                    items
                        .into_iter()
                        .map(|v| self.decode_provider(item, v))
                        .collect::<Result<_>>()?,
                )),
                serde_json::Value::Object(entries) if !*is_list => Ok(Value::Dict(
                    entries
                        .into_iter()
                        .map(|(k, v)| Ok((k, self.decode_provider(item, v)?)))
                        .collect::<Result<_>>()?,
                )),
                other => Err(unexpected(&other, id)),
            },

            Provider::Object { class, properties } => {
                let mut entries = match json {
                    serde_json::Value::Object(entries) => entries,
                    other => return Err(unexpected(&other, id)),
                };

                let mut values = Vec::with_capacity(properties.len());
                for step in properties {
                    let Some(raw) = entries.remove(&step.wire_name) else {
                        continue;
                    };
                    let raw = self.decode_provider(&step.provider, raw)?;
                    values.push((
                        step.local_name.clone(),
                        self.runtime.finish_property(&step.value, raw)?,
                    ));
                }
                Ok(Value::Object(self.materializer.instantiate(class, values)?))
            }
        }
    }
}

/// Decoder over byte ranges of a source.
///
/// Held in an `Rc` so that deferred properties can keep decoding after the
/// call that produced their object has returned.
pub struct StreamDecoder {
    plan: Arc<DecodePlan>,
    source: Rc<dyn JsonSource>,
    runtime: Rc<DecodeRuntime>,
    materializer: LazyMaterializer,
}

impl StreamDecoder {
    pub fn new(
        plan: Arc<DecodePlan>,
        source: Rc<dyn JsonSource>,
        runtime: Rc<DecodeRuntime>,
    ) -> Rc<Self> {
        let materializer = LazyMaterializer::new(runtime.classes.clone());
        Rc::new(Self {
            plan,
            source,
            runtime,
            materializer,
        })
    }

    pub fn plan(&self) -> &DecodePlan {
        &self.plan
    }

    /// Decode the whole source as the root value.
    pub fn decode(self: &Rc<Self>) -> Result<Value> {
        let length = self.source.len()?;
        let value = self.from_stream(&self.plan.root, 0, Some(length))?;
        check_root(&self.plan, value)
    }

    /// Decode the value in `[offset, offset + length)` with provider `id`.
    pub fn from_stream(self: &Rc<Self>, id: &str, offset: u64, length: Option<u64>) -> Result<Value> {
        let provider = self.plan.provider(id).ok_or_else(|| missing_provider(id))?;

        match provider {
            Provider::Scalar { .. } | Provider::Collection { split: false, .. } => {
                self.decode_range(id, offset, length)
            }

            Provider::Composite { arms } => {
                let peeked = self.peek(offset, length)?;
                let arm = arms
                    .iter()
                    .find(|arm| arm.guard.matches_json(&peeked))
                    .ok_or_else(|| unexpected(&peeked, id))?;
                self.from_stream(&arm.provider, offset, length)
            }

            Provider::Collection {
                is_list: true,
                item,
                ..
            } => {
                let Some(split) = split_list(self.source.as_ref(), offset, length)? else {
                    return Err(unexpected(&serde_json::Value::Null, id));
                };
                let mut items = Vec::new();
                for range in split {
                    let (item_offset, item_length) = range?;
                    items.push(self.from_stream(item, item_offset, Some(item_length))?);
                }
                Ok(Value::List(items))
            }

            Provider::Collection {
                is_list: false,
                item,
                ..
            } => {
                let Some(split) = split_dict(self.source.as_ref(), offset, length)? else {
                    return Err(unexpected(&serde_json::Value::Null, id));
                };
                let mut entries = IndexMap::new();
                for entry in split {
                    let (key, (item_offset, item_length)) = entry?;
                    let value = self.from_stream(item, item_offset, Some(item_length))?;
                    entries.insert(key, value);
                }
                Ok(Value::Dict(entries))
            }

            Provider::Object { class, properties } => {
                let Some(split) = split_dict(self.source.as_ref(), offset, length)? else {
                    return Err(unexpected(&serde_json::Value::Null, id));
                };

                let mut thunks = Vec::with_capacity(properties.len());
                for entry in split {
                    let (key, (value_offset, value_length)) = entry?;
                    let Some(step) = properties.iter().find(|s| s.wire_name == key) else {
                        continue;
                    };

                    let decoder = Rc::clone(self);
                    let provider = step.provider.clone();
                    let accessor = step.value.clone();
                    let thunk: Thunk = Box::new(move || {
                        let raw = decoder.from_stream(&provider, value_offset, Some(value_length))?;
                        decoder.runtime.finish_property(&accessor, raw)
                    });
                    thunks.push((step.local_name.clone(), thunk));
                }
                Ok(Value::Object(self.materializer.instantiate(class, thunks)?))
            }
        }
    }

    /// Validate and parse a range as one document, then convert it.
    fn decode_range(&self, id: &str, offset: u64, length: Option<u64>) -> Result<Value> {
        for token in Lexer::new(self.source.as_ref(), offset, length) {
            token?;
        }
        let bytes = self.source.read_range(offset, length)?;
        let json: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| CodecError::invalid_stream(offset, e.to_string()))?;
        EagerDecoder::new(&self.plan, &self.runtime).decode_provider(id, json)
    }

    /// Stand-in JSON value with the shape of the range, for guard tests.
    ///
    /// Containers are recognized by their first token; scalars are parsed.
    fn peek(&self, offset: u64, length: Option<u64>) -> Result<serde_json::Value> {
        let first = match Lexer::new(self.source.as_ref(), offset, length).next() {
            Some(token) => token?,
            None => return Err(CodecError::invalid_stream(offset, "JSON is not valid.")),
        };

        match first.text.as_str() {
            "{" => Ok(serde_json::Value::Object(serde_json::Map::new())),
            "[" => Ok(serde_json::Value::Array(Vec::new())),
            _ => {
                for token in Lexer::new(self.source.as_ref(), offset, length) {
                    token?;
                }
                let bytes = self.source.read_range(offset, length)?;
                serde_json::from_slice(&bytes)
                    .map_err(|e| CodecError::invalid_stream(offset, e.to_string()))
            }
        }
    }
}
