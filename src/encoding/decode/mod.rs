// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode plans.
//!
//! A decode plan is a table of *providers*, one per distinct type reachable
//! from the root, keyed by canonical type string. Providers refer to each
//! other by key, which is how recursive types are expressed: a ghost node in
//! the data model simply reuses the key of the provider its ancestor owns.
//!
//! String mode walks an eagerly parsed `serde_json` document; stream and
//! resource modes read byte ranges from a [`crate::stream::JsonSource`] and
//! defer object properties.

pub mod builder;
pub mod decoder;
pub mod executor;
pub mod materializer;

pub use builder::DecodePlanBuilder;
pub use decoder::JsonDecoder;
pub use executor::{DecodeRuntime, StreamDecoder};
pub use materializer::{EagerMaterializer, LazyMaterializer};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Mode, Result};
use crate::datamodel::Accessor;
use crate::encoding::guard::Guard;
use crate::schema::TypeDescriptor;

/// Union arm of a composite provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeArm {
    pub guard: Guard,
    /// Provider decoding the value when the guard matches
    pub provider: String,
}

/// Decoding of one object property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyStep {
    /// Key in the JSON object
    pub wire_name: String,
    /// Property set on the instance
    pub local_name: String,
    pub provider: String,
    /// Instance value computed from the raw one
    pub value: Accessor,
}

/// How to decode values of one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum Provider {
    /// Scalar, enum or date-time, converted from its JSON form
    Scalar { ty: TypeDescriptor },

    /// First arm whose guard accepts the JSON value
    Composite { arms: Vec<DecodeArm> },

    Collection {
        is_list: bool,
        item: String,
        /// Decode items one range at a time instead of as one document
        split: bool,
    },

    Object {
        class: String,
        properties: Vec<PropertyStep>,
    },
}

/// Compiled decode routine for one (type, mode) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodePlan {
    pub mode: Mode,
    pub type_signature: String,
    /// Provider of the root value
    pub root: String,
    pub providers: IndexMap<String, Provider>,
}

impl DecodePlan {
    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.get(id)
    }

    /// Type the root provider produces.
    pub fn root_type(&self) -> Result<TypeDescriptor> {
        crate::schema::parse_type(&self.type_signature)
    }
}
