// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode plans.
//!
//! An encode plan is a sequence of operations that writes the JSON text of
//! one type. Plans are generated once per (type, mode), optimized, stored in
//! the plan cache and executed by [`executor::Fragments`].
//!
//! The three modes only differ in the write operation they use:
//! [`EncodeOp::Yield`] hands fragments back to the caller,
//! [`EncodeOp::Write`] pushes them into a [`crate::stream::StreamWriter`] and
//! [`EncodeOp::RawWrite`] writes them to an `io::Write` handle.

pub mod builder;
pub mod encoder;
pub mod executor;
pub mod optimizer;

pub use builder::EncodePlanBuilder;
pub use encoder::JsonEncoder;
pub use executor::{Encoded, Fragments};
pub use optimizer::optimize;

use serde::{Deserialize, Serialize};

use crate::core::Mode;
use crate::datamodel::Accessor;
use crate::encoding::guard::Guard;

/// Text produced by a write operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fragment {
    /// Constant text
    Literal(String),
    /// JSON encoding of a value
    Json(Accessor),
    /// String value written verbatim
    Text(Accessor),
}

/// A single encode operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EncodeOp {
    /// Hand a fragment back to the caller (string mode).
    Yield { fragment: Fragment },

    /// Push a fragment into the stream writer (stream mode).
    Write { fragment: Fragment },

    /// Write a fragment to the raw output handle (resource mode).
    RawWrite { fragment: Fragment },

    /// Bind a variable.
    Let {
        /// Variable name
        name: String,
        /// Value to bind
        value: Accessor,
    },

    /// Run the first arm whose guard accepts the subject.
    Branch {
        /// Value being tested
        subject: Accessor,
        /// Arms, in test order
        arms: Vec<BranchArm>,
    },

    /// Run the body once per collection entry.
    ForEach {
        /// Collection being iterated
        subject: Accessor,
        /// Variable bound to the entry key, for dicts
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        /// Variable bound to the entry value
        item: String,
        /// Operations run per entry
        body: Vec<EncodeOp>,
    },
}

impl EncodeOp {
    /// The write operation of `mode`.
    pub fn emit(mode: Mode, fragment: Fragment) -> Self {
        match mode {
            Mode::String => EncodeOp::Yield { fragment },
            Mode::Stream => EncodeOp::Write { fragment },
            Mode::Resource => EncodeOp::RawWrite { fragment },
        }
    }

    /// Fragment written by this operation, if it is a write.
    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            EncodeOp::Yield { fragment }
            | EncodeOp::Write { fragment }
            | EncodeOp::RawWrite { fragment } => Some(fragment),
            _ => None,
        }
    }
}

/// One guarded arm of a [`EncodeOp::Branch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchArm {
    pub guard: Guard,
    pub body: Vec<EncodeOp>,
}

/// Compiled encode routine for one (type, mode) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodePlan {
    /// Mode the plan writes for
    pub mode: Mode,
    /// Canonical signature of the encoded type
    pub type_signature: String,
    /// Operations, in execution order
    pub ops: Vec<EncodeOp>,
}

impl EncodePlan {
    pub fn new(mode: Mode, type_signature: impl Into<String>, ops: Vec<EncodeOp>) -> Self {
        Self {
            mode,
            type_signature: type_signature.into(),
            ops,
        }
    }

    /// Number of operations, nested ones included.
    pub fn op_count(&self) -> usize {
        fn count(ops: &[EncodeOp]) -> usize {
            ops.iter()
                .map(|op| {
                    1 + match op {
                        EncodeOp::Branch { arms, .. } => arms.iter().map(|a| count(&a.body)).sum(),
                        EncodeOp::ForEach { body, .. } => count(body),
                        _ => 0,
                    }
                })
                .sum()
        }
        count(&self.ops)
    }
}
