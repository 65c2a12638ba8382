// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Literal write merging.
//!
//! Consecutive literal writes of the same kind are folded into one write of
//! the concatenated text. Any other operation ends the run.

use super::{BranchArm, EncodeOp, EncodePlan, Fragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Yield,
    Write,
    RawWrite,
}

fn literal(op: &EncodeOp) -> Option<(WriteKind, &str)> {
    match op {
        EncodeOp::Yield {
            fragment: Fragment::Literal(text),
        } => Some((WriteKind::Yield, text)),
        EncodeOp::Write {
            fragment: Fragment::Literal(text),
        } => Some((WriteKind::Write, text)),
        EncodeOp::RawWrite {
            fragment: Fragment::Literal(text),
        } => Some((WriteKind::RawWrite, text)),
        _ => None,
    }
}

fn literal_mut(op: &mut EncodeOp) -> Option<(WriteKind, &mut String)> {
    match op {
        EncodeOp::Yield {
            fragment: Fragment::Literal(text),
        } => Some((WriteKind::Yield, text)),
        EncodeOp::Write {
            fragment: Fragment::Literal(text),
        } => Some((WriteKind::Write, text)),
        EncodeOp::RawWrite {
            fragment: Fragment::Literal(text),
        } => Some((WriteKind::RawWrite, text)),
        _ => None,
    }
}

/// Merge literal runs in a plan, nested bodies included.
pub fn optimize(plan: EncodePlan) -> EncodePlan {
    EncodePlan {
        ops: merge(plan.ops),
        ..plan
    }
}

fn merge(ops: Vec<EncodeOp>) -> Vec<EncodeOp> {
    let mut merged: Vec<EncodeOp> = Vec::with_capacity(ops.len());

    for op in ops {
        let op = match op {
            EncodeOp::Branch { subject, arms } => EncodeOp::Branch {
                subject,
                arms: arms
                    .into_iter()
                    .map(|arm| BranchArm {
                        guard: arm.guard,
                        body: merge(arm.body),
                    })
                    .collect(),
            },
            EncodeOp::ForEach {
                subject,
                key,
                item,
                body,
            } => EncodeOp::ForEach {
                subject,
                key,
                item,
                body: merge(body),
            },
            other => other,
        };

        if let Some((kind, text)) = literal(&op) {
            if let Some((last_kind, buffer)) = merged.last_mut().and_then(literal_mut) {
                if last_kind == kind {
                    buffer.push_str(text);
                    continue;
                }
            }
        }
        merged.push(op);
    }

    merged
}
