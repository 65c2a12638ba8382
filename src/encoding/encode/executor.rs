// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode plan execution.
//!
//! [`Fragments`] walks a plan with an explicit frame stack and produces the
//! text of each write operation as it is reached, so string-mode output can
//! be consumed incrementally without building the whole document.

use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;
use std::vec;

use super::{EncodeOp, EncodePlan, Fragment};
use crate::core::{CodecError, Result, Value};
use crate::datamodel::{Runtime, Scope, DATA_VARIABLE};
use crate::mapping::{FormatterRegistry, ServiceLocator};
use crate::stream::StreamWriter;

/// Result of encoding one value.
///
/// Nothing is written until the fragments are consumed.
pub struct Encoded<'a> {
    plan: Arc<EncodePlan>,
    data: &'a Value,
    config: Value,
    services: &'a dyn ServiceLocator,
    formatters: &'a FormatterRegistry,
}

impl<'a> Encoded<'a> {
    pub fn new(
        plan: Arc<EncodePlan>,
        data: &'a Value,
        config: Value,
        services: &'a dyn ServiceLocator,
        formatters: &'a FormatterRegistry,
    ) -> Self {
        Self {
            plan,
            data,
            config,
            services,
            formatters,
        }
    }

    pub fn plan(&self) -> &EncodePlan {
        &self.plan
    }

    /// Lazily produced JSON fragments.
    pub fn fragments(&self) -> Fragments<'_> {
        let mut scope = Scope::new(Runtime {
            config: &self.config,
            services: self.services,
            formatters: self.formatters,
        });
        scope.bind(DATA_VARIABLE, Cow::Borrowed(self.data));

        Fragments {
            scope,
            stack: vec![Frame::Block {
                ops: &self.plan.ops,
                index: 0,
            }],
            failed: false,
        }
    }

    /// Push every fragment into a stream writer.
    pub fn write_to(&self, sink: &mut dyn StreamWriter) -> Result<()> {
        for fragment in self.fragments() {
            sink.write_fragment(&fragment?)?;
        }
        Ok(())
    }

    /// Write every fragment to a raw output handle.
    pub fn write_raw(&self, handle: &mut dyn Write) -> Result<()> {
        for fragment in self.fragments() {
            handle.write_all(fragment?.as_bytes())?;
        }
        handle.flush()?;
        Ok(())
    }

    /// The whole JSON document.
    pub fn into_string(self) -> Result<String> {
        self.fragments().collect()
    }
}

type Entry<'s> = (Option<String>, Cow<'s, Value>);

enum Frame<'s> {
    Block {
        ops: &'s [EncodeOp],
        index: usize,
    },
    Loop {
        body: &'s [EncodeOp],
        key: Option<&'s str>,
        item: &'s str,
        entries: vec::IntoIter<Entry<'s>>,
    },
}

enum Step<'s> {
    Op(&'s EncodeOp),
    Enter(&'s [EncodeOp]),
    Leave,
}

/// Iterator over the fragments of one encoding.
pub struct Fragments<'s> {
    scope: Scope<'s>,
    stack: Vec<Frame<'s>>,
    failed: bool,
}

impl<'s> Fragments<'s> {
    fn advance(&mut self) -> Result<Option<String>> {
        loop {
            let step = match self.stack.last_mut() {
                None => return Ok(None),
                Some(Frame::Block { ops, index }) => {
                    let ops: &'s [EncodeOp] = *ops;
                    match ops.get(*index) {
                        Some(op) => {
                            *index += 1;
                            Step::Op(op)
                        }
                        None => Step::Leave,
                    }
                }
                Some(Frame::Loop {
                    body,
                    key,
                    item,
                    entries,
                }) => match entries.next() {
                    Some((entry_key, value)) => {
                        if let (Some(name), Some(entry_key)) = (*key, entry_key) {
                            self.scope.bind(name, Cow::Owned(Value::String(entry_key)));
                        }
                        self.scope.bind(*item, value);
                        Step::Enter(*body)
                    }
                    None => Step::Leave,
                },
            };

            let op = match step {
                Step::Leave => {
                    self.stack.pop();
                    continue;
                }
                Step::Enter(body) => {
                    self.stack.push(Frame::Block { ops: body, index: 0 });
                    continue;
                }
                Step::Op(op) => op,
            };

            match op {
                EncodeOp::Yield { fragment }
                | EncodeOp::Write { fragment }
                | EncodeOp::RawWrite { fragment } => return self.render(fragment).map(Some),

                EncodeOp::Let { name, value } => {
                    let value = self.scope.eval(value)?;
                    self.scope.bind(name.as_str(), value);
                }

                EncodeOp::Branch { subject, arms } => {
                    let value = self.scope.eval(subject)?;
                    let arm = arms
                        .iter()
                        .find(|arm| arm.guard.matches_value(&value))
                        .ok_or_else(|| {
                            CodecError::unexpected_value(format!(
                                "Unexpected \"{}\" value.",
                                value.kind_name()
                            ))
                        })?;
                    self.stack.push(Frame::Block {
                        ops: &arm.body,
                        index: 0,
                    });
                }

                EncodeOp::ForEach {
                    subject,
                    key,
                    item,
                    body,
                } => {
                    let entries = entries(self.scope.eval(subject)?)?;
                    self.stack.push(Frame::Loop {
                        body,
                        key: key.as_deref(),
                        item,
                        entries: entries.into_iter(),
                    });
                }
            }
        }
    }

    fn render(&self, fragment: &Fragment) -> Result<String> {
        match fragment {
            Fragment::Literal(text) => Ok(text.clone()),
            Fragment::Json(accessor) => self.scope.eval(accessor)?.encode_json(),
            Fragment::Text(accessor) => match self.scope.eval(accessor)?.as_ref() {
                Value::String(text) => Ok(text.clone()),
                other => Err(CodecError::unexpected_value(format!(
                    "Expected a string, got \"{}\".",
                    other.kind_name()
                ))),
            },
        }
    }
}

/// Entries of a list or dict; list keys are indices.
fn entries(value: Cow<'_, Value>) -> Result<Vec<Entry<'_>>> {
    match value {
        Cow::Borrowed(Value::List(items)) => Ok(items
            .iter()
            .enumerate()
            .map(|(i, v)| (Some(i.to_string()), Cow::Borrowed(v)))
            .collect()),
        Cow::Borrowed(Value::Dict(map)) => Ok(map
            .iter()
            .map(|(k, v)| (Some(k.clone()), Cow::Borrowed(v)))
            .collect()),
        Cow::Owned(Value::List(items)) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Some(i.to_string()), Cow::Owned(v)))
            .collect()),
        Cow::Owned(Value::Dict(map)) => Ok(map
            .into_iter()
            .map(|(k, v)| (Some(k), Cow::Owned(v)))
            .collect()),
        other => Err(CodecError::unexpected_value(format!(
            "Unexpected \"{}\" value.",
            other.kind_name()
        ))),
    }
}

impl Iterator for Fragments<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.advance().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}
