// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Data model graphs.
//!
//! A data model graph is the traversal plan for one type: which properties
//! an object has, which node each collection item goes through, and in what
//! order union members are tried. The encode and decode graphs share their
//! shape but differ in identity handling:
//!
//! - encode graphs count nested expansions per class and stop at the
//!   configured max depth;
//! - decode graphs remember the types already expanded on the current path
//!   and put a ghost node where a type recurses into itself.

pub mod accessor;
pub mod decode;
pub mod encode;

pub use accessor::{Accessor, Runtime, Scope, CONFIG_VARIABLE, DATA_VARIABLE, RAW_VALUE, SERVICES_VARIABLE};
pub use decode::{DecodeDataModelBuilder, DecodeNode, DecodeProperty};
pub use encode::{EncodeDataModelBuilder, EncodeNode};

use crate::core::{CodecError, Result};

/// Shape class of a node, used to order union members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Scalar = 0,
    Object = 1,
    Collection = 2,
}

/// Order union members most specific first.
///
/// The sort is stable, so members of equal precision keep their declared
/// order.
pub(crate) fn order_members<N>(
    mut members: Vec<N>,
    precision: impl Fn(&N) -> Option<Precision>,
) -> Result<Vec<N>> {
    if members.len() < 2 {
        return Err(CodecError::Other(
            "composite node expects at least 2 members".to_string(),
        ));
    }
    if members.iter().any(|m| precision(m).is_none()) {
        return Err(CodecError::Other(
            "cannot nest a composite node in another composite node".to_string(),
        ));
    }

    members.sort_by_key(|m| std::cmp::Reverse(precision(m)));
    Ok(members)
}
