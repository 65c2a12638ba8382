// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Runtime type tests guarding union branches.

use serde::{Deserialize, Serialize};

use crate::core::{Result, Value};
use crate::schema::{ScalarKind, TypeDescriptor};

/// Test selecting one union branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum Guard {
    /// Instance of the class
    Object { class: String },
    /// Host date-time, a string on the wire
    DateTime,
    /// Case of the enum, backed by `backing` on the wire
    Enum { name: String, backing: ScalarKind },
    List,
    Dict,
    /// Scalar kind, including `null` and `mixed`
    Kind { kind: ScalarKind },
}

impl Guard {
    /// Guard for a union member of type `ty`.
    pub fn of(ty: &TypeDescriptor) -> Result<Self> {
        Ok(match ty {
            TypeDescriptor::Object { .. } if ty.is_date_time() => Guard::DateTime,
            TypeDescriptor::Object { class, .. } => Guard::Object {
                class: class.clone(),
            },
            TypeDescriptor::BackedEnum { enum_type, backing } => Guard::Enum {
                name: enum_type.clone(),
                backing: *backing,
            },
            TypeDescriptor::Collection { is_list: true, .. } => Guard::List,
            TypeDescriptor::Collection { is_list: false, .. } => Guard::Dict,
            TypeDescriptor::Scalar(kind) => Guard::Kind { kind: *kind },
            TypeDescriptor::Union(_) | TypeDescriptor::Template(_) => {
                return Err(crate::core::CodecError::unsupported_type(ty.to_string()))
            }
        })
    }

    /// Test a host value, on the encode side.
    pub fn matches_value(&self, value: &Value) -> bool {
        match (self, value) {
            (Guard::Object { class }, Value::Object(object)) => object.class() == class,
            (Guard::DateTime, Value::DateTime(_)) => true,
            (Guard::Enum { name, .. }, Value::Enum(case)) => &case.enum_type == name,
            (Guard::List, Value::List(_)) => true,
            (Guard::Dict, Value::Dict(_)) => true,
            (Guard::Kind { kind }, value) => match kind {
                ScalarKind::Mixed => true,
                ScalarKind::Null => value.is_null(),
                ScalarKind::Bool => matches!(value, Value::Bool(_)),
                ScalarKind::Int => matches!(value, Value::Int(_)),
                ScalarKind::Float => matches!(value, Value::Float(_) | Value::Int(_)),
                ScalarKind::String => matches!(value, Value::String(_)),
            },
            _ => false,
        }
    }

    /// Test a decoded JSON value, on the decode side.
    pub fn matches_json(&self, json: &serde_json::Value) -> bool {
        match self {
            Guard::Object { .. } | Guard::Dict => json.is_object(),
            Guard::List => json.is_array(),
            Guard::DateTime => json.is_string(),
            Guard::Enum { backing, .. } => Self::kind_matches_json(*backing, json),
            Guard::Kind { kind } => Self::kind_matches_json(*kind, json),
        }
    }

    fn kind_matches_json(kind: ScalarKind, json: &serde_json::Value) -> bool {
        match kind {
            ScalarKind::Mixed => true,
            ScalarKind::Null => json.is_null(),
            ScalarKind::Bool => json.is_boolean(),
            ScalarKind::Int => json.is_i64() || json.is_u64(),
            ScalarKind::Float => json.is_f64(),
            ScalarKind::String => json.is_string(),
        }
    }
}
