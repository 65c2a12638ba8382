// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type descriptors.
//!
//! A [`TypeDescriptor`] is the algebraic description of a JSON-relevant type
//! shape. Its canonical string form (see the [`fmt::Display`] impl) is the
//! identity used for ghost detection, provider memoization and plan cache
//! keys, and it round-trips through [`crate::schema::parser::parse_type`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{CodecError, Value};

/// Class name of the host date-time value.
pub const DATE_TIME_CLASS: &str = "DateTime";

/// Scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
    Null,
    Mixed,
}

impl ScalarKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Null => "null",
            ScalarKind::Mixed => "mixed",
        }
    }

    /// Look up a scalar kind by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ScalarKind::String),
            "int" => Some(ScalarKind::Int),
            "float" => Some(ScalarKind::Float),
            "bool" => Some(ScalarKind::Bool),
            "null" => Some(ScalarKind::Null),
            "mixed" => Some(ScalarKind::Mixed),
            _ => None,
        }
    }
}

/// Structural description of a value's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Leaf scalar
    Scalar(ScalarKind),

    /// Enum whose cases are backed by a string or int
    BackedEnum {
        /// Kind of the backing values
        backing: ScalarKind,
        /// Owning enum
        enum_type: String,
    },

    /// Class instance, optionally with generic arguments
    Object {
        /// Class identity
        class: String,
        /// Generic arguments, in template order
        generics: Vec<TypeDescriptor>,
    },

    /// List (sequential) or dict (string-keyed) of values
    Collection {
        /// Item type
        value: Box<TypeDescriptor>,
        /// `true` for lists, `false` for dicts
        is_list: bool,
    },

    /// Union of at least two members, never nested
    Union(Vec<TypeDescriptor>),

    /// Template variable of a generic class, substituted before building
    Template(String),
}

impl TypeDescriptor {
    pub fn string() -> Self {
        TypeDescriptor::Scalar(ScalarKind::String)
    }

    pub fn int() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Float)
    }

    pub fn bool() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Bool)
    }

    pub fn null() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Null)
    }

    pub fn mixed() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Mixed)
    }

    /// Non-generic object type.
    pub fn object(class: impl Into<String>) -> Self {
        TypeDescriptor::Object {
            class: class.into(),
            generics: Vec::new(),
        }
    }

    /// Generic object type.
    pub fn generic(class: impl Into<String>, generics: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Object {
            class: class.into(),
            generics,
        }
    }

    pub fn date_time() -> Self {
        Self::object(DATE_TIME_CLASS)
    }

    pub fn backed_enum(enum_type: impl Into<String>, backing: ScalarKind) -> Self {
        TypeDescriptor::BackedEnum {
            backing,
            enum_type: enum_type.into(),
        }
    }

    pub fn list(value: TypeDescriptor) -> Self {
        TypeDescriptor::Collection {
            value: Box::new(value),
            is_list: true,
        }
    }

    pub fn dict(value: TypeDescriptor) -> Self {
        TypeDescriptor::Collection {
            value: Box::new(value),
            is_list: false,
        }
    }

    pub fn template(name: impl Into<String>) -> Self {
        TypeDescriptor::Template(name.into())
    }

    /// Build a union, flattening nested unions and collapsing a single member.
    pub fn union(members: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut flat = Vec::new();
        for member in members {
            match member {
                TypeDescriptor::Union(inner) => {
                    for m in inner {
                        if !flat.contains(&m) {
                            flat.push(m);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }

        if flat.len() == 1 {
            flat.remove(0)
        } else {
            TypeDescriptor::Union(flat)
        }
    }

    /// `T|null`.
    pub fn nullable(inner: TypeDescriptor) -> Self {
        Self::union([inner, Self::null()])
    }

    /// Class name for object types.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Object { class, .. } => Some(class),
            _ => None,
        }
    }

    pub fn is_date_time(&self) -> bool {
        self.class_name() == Some(DATE_TIME_CLASS)
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            TypeDescriptor::Scalar(ScalarKind::Null) | TypeDescriptor::Scalar(ScalarKind::Mixed) => {
                true
            }
            TypeDescriptor::Union(members) => members.iter().any(|m| m.is_nullable()),
            _ => false,
        }
    }

    /// For `T|null` unions, the non-null member.
    pub fn non_null_member(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Union(members) if members.len() == 2 => {
                let mut rest = members
                    .iter()
                    .filter(|m| !matches!(m, TypeDescriptor::Scalar(ScalarKind::Null)));
                match (rest.next(), rest.next()) {
                    (Some(only), None) => Some(only),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Find the first object type with the given class, searching depth-first.
    pub fn find_object(&self, class: &str) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Object {
                class: own,
                generics,
            } => {
                if own == class {
                    return Some(self);
                }
                generics.iter().find_map(|g| g.find_object(class))
            }
            TypeDescriptor::Collection { value, .. } => value.find_object(class),
            TypeDescriptor::Union(members) => members.iter().find_map(|m| m.find_object(class)),
            _ => None,
        }
    }

    /// Replace template variables.
    pub fn substitute(&self, bindings: &HashMap<String, TypeDescriptor>) -> TypeDescriptor {
        match self {
            TypeDescriptor::Template(name) => bindings
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeDescriptor::Object { class, generics } => TypeDescriptor::Object {
                class: class.clone(),
                generics: generics.iter().map(|g| g.substitute(bindings)).collect(),
            },
            TypeDescriptor::Collection { value, is_list } => TypeDescriptor::Collection {
                value: Box::new(value.substitute(bindings)),
                is_list: *is_list,
            },
            TypeDescriptor::Union(members) => {
                TypeDescriptor::union(members.iter().map(|m| m.substitute(bindings)))
            }
            _ => self.clone(),
        }
    }

    /// Turn bare object references named like a template into templates.
    pub(crate) fn bind_templates(&self, templates: &[String]) -> TypeDescriptor {
        match self {
            TypeDescriptor::Object { class, generics }
                if generics.is_empty() && templates.iter().any(|t| t == class) =>
            {
                TypeDescriptor::Template(class.clone())
            }
            TypeDescriptor::Object { class, generics } => TypeDescriptor::Object {
                class: class.clone(),
                generics: generics.iter().map(|g| g.bind_templates(templates)).collect(),
            },
            TypeDescriptor::Collection { value, is_list } => TypeDescriptor::Collection {
                value: Box::new(value.bind_templates(templates)),
                is_list: *is_list,
            },
            TypeDescriptor::Union(members) => {
                TypeDescriptor::union(members.iter().map(|m| m.bind_templates(templates)))
            }
            _ => self.clone(),
        }
    }

    /// Whether a host value satisfies this type.
    ///
    /// Objects are checked by class only, so lazy properties are not forced.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDescriptor::Scalar(ScalarKind::Mixed), _) => true,
            (TypeDescriptor::Template(_), _) => true,
            (TypeDescriptor::Scalar(ScalarKind::Null), Value::Null) => true,
            (TypeDescriptor::Scalar(ScalarKind::String), Value::String(_)) => true,
            (TypeDescriptor::Scalar(ScalarKind::Int), Value::Int(_)) => true,
            (TypeDescriptor::Scalar(ScalarKind::Float), Value::Float(_) | Value::Int(_)) => true,
            (TypeDescriptor::Scalar(ScalarKind::Bool), Value::Bool(_)) => true,
            (TypeDescriptor::BackedEnum { enum_type, .. }, Value::Enum(case)) => {
                &case.enum_type == enum_type
            }
            (TypeDescriptor::Object { class, .. }, Value::DateTime(_)) => class == DATE_TIME_CLASS,
            (TypeDescriptor::Object { class, .. }, Value::Object(object)) => object.class() == class,
            (
                TypeDescriptor::Collection {
                    value: item,
                    is_list: true,
                },
                Value::List(items),
            ) => items.iter().all(|v| item.accepts(v)),
            (
                TypeDescriptor::Collection {
                    value: item,
                    is_list: false,
                },
                Value::Dict(entries),
            ) => entries.values().all(|v| item.accepts(v)),
            (TypeDescriptor::Union(members), v) => members.iter().any(|m| m.accepts(v)),
            _ => false,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Scalar(kind) => f.write_str(kind.as_str()),
            TypeDescriptor::BackedEnum { backing, enum_type } => {
                write!(f, "enum<{enum_type}, {}>", backing.as_str())
            }
            TypeDescriptor::Object { class, generics } => {
                f.write_str(class)?;
                if !generics.is_empty() {
                    f.write_str("<")?;
                    for (i, g) in generics.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{g}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeDescriptor::Collection { value, is_list } => {
                let name = if *is_list { "list" } else { "dict" };
                write!(f, "{name}<{value}>")
            }
            TypeDescriptor::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            TypeDescriptor::Template(name) => f.write_str(name),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::schema::parser::parse_type(s)
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let signature = String::deserialize(deserializer)?;
        signature.parse().map_err(serde::de::Error::custom)
    }
}
