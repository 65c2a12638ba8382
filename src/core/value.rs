// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Host value model.
//!
//! [`Value`] is the dynamic representation of everything the codec reads and
//! produces: scalars, backed-enum cases, date-times, lists, dicts and class
//! instances. Class instances ([`Object`]) may carry deferred properties that
//! are computed on first read and cached, which is what lazy materialization
//! of streamed JSON relies on.
//!
//! Objects are reference counted and deferred slots use `unsync` cells, so a
//! [`Value`] is neither `Send` nor `Sync`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use super::error::{CodecError, Result};

/// Zero-argument producer of a deferred property value.
pub type Thunk = Box<dyn FnOnce() -> Result<Value>>;

/// Dynamic host value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Case of a backed enum
    Enum(EnumCase),
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    /// String-keyed map, in insertion order
    Dict(IndexMap<String, Value>),
    /// Class instance
    Object(Object),
}

/// Backing value of an enum case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackingValue {
    Int(i64),
    String(String),
}

impl BackingValue {
    /// Read a backing value out of a scalar.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(BackingValue::Int(*i)),
            Value::String(s) => Some(BackingValue::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            BackingValue::Int(i) => Value::Int(*i),
            BackingValue::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for BackingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackingValue::Int(i) => write!(f, "{i}"),
            BackingValue::String(s) => f.write_str(s),
        }
    }
}

/// A case of a backed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumCase {
    /// Owning enum
    pub enum_type: String,
    /// Case name
    pub name: String,
    /// Backing value, written to JSON
    pub value: BackingValue,
}

impl Value {
    /// Name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Enum(case) => case.enum_type.clone(),
            Value::DateTime(_) => crate::schema::DATE_TIME_CLASS.to_string(),
            Value::List(_) => "list".to_string(),
            Value::Dict(_) => "dict".to_string(),
            Value::Object(object) => object.class().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Convert a generic JSON value. JSON objects become dicts.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Dict(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a generic JSON value, forcing deferred properties.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    CodecError::unexpected_value(format!("{f} cannot be JSON encoded."))
                })?,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Enum(case) => match &case.value {
                BackingValue::Int(i) => serde_json::Value::from(*i),
                BackingValue::String(s) => serde_json::Value::String(s.clone()),
            },
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_>>()?,
            ),
            Value::Dict(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_json()?)))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(object) => {
                let mut map = serde_json::Map::new();
                for name in object.property_names() {
                    if let Some(value) = object.get(name)? {
                        map.insert(name.to_string(), value.to_json()?);
                    }
                }
                serde_json::Value::Object(map)
            }
        })
    }

    /// Generic JSON encoding of the whole value.
    pub fn encode_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Enum(case) => write!(f, "Enum({}::{})", case.enum_type, case.name),
            Value::DateTime(dt) => write!(f, "DateTime({})", dt.to_rfc3339()),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Dict(entries) => f.debug_map().entries(entries).finish(),
            Value::Object(object) => object.fmt(f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<EnumCase> for Value {
    fn from(case: EnumCase) -> Self {
        Value::Enum(case)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

/// Class instance.
///
/// Cloning is cheap and shares property state, so forcing a deferred
/// property through one clone is visible through all of them.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectData>,
}

struct ObjectData {
    class: String,
    slots: IndexMap<String, Slot>,
}

struct Slot {
    value: OnceCell<Value>,
    init: Cell<Option<Thunk>>,
}

impl Object {
    /// Build a fully populated object.
    pub fn new<K, I>(class: impl Into<String>, properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let slots = properties
            .into_iter()
            .map(|(name, value)| {
                (
                    name.into(),
                    Slot {
                        value: OnceCell::with_value(value),
                        init: Cell::new(None),
                    },
                )
            })
            .collect();

        Self {
            inner: Rc::new(ObjectData {
                class: class.into(),
                slots,
            }),
        }
    }

    /// Build an object whose properties are computed on first read.
    pub fn deferred<I>(class: impl Into<String>, thunks: I) -> Self
    where
        I: IntoIterator<Item = (String, Thunk)>,
    {
        let slots = thunks
            .into_iter()
            .map(|(name, thunk)| {
                (
                    name,
                    Slot {
                        value: OnceCell::new(),
                        init: Cell::new(Some(thunk)),
                    },
                )
            })
            .collect();

        Self {
            inner: Rc::new(ObjectData {
                class: class.into(),
                slots,
            }),
        }
    }

    pub fn class(&self) -> &str {
        &self.inner.class
    }

    /// Names of the properties this instance holds, in order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.inner.slots.keys().map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    /// Read a property, computing it first if deferred.
    ///
    /// Returns `Ok(None)` when the instance has no such property.
    pub fn get(&self, name: &str) -> Result<Option<&Value>> {
        let Some(slot) = self.inner.slots.get(name) else {
            return Ok(None);
        };

        slot.value
            .get_or_try_init(|| match slot.init.take() {
                Some(thunk) => thunk(),
                None => Err(CodecError::Other(format!(
                    "property \"{}::{name}\" failed to initialize earlier",
                    self.inner.class
                ))),
            })
            .map(Some)
    }

    /// Whether a property has a value already, without forcing it.
    pub fn is_initialized(&self, name: &str) -> bool {
        self.inner
            .slots
            .get(name)
            .is_some_and(|slot| slot.value.get().is_some())
    }

    /// Force every deferred property.
    pub fn force(&self) -> Result<()> {
        for name in self.property_names() {
            self.get(name)?;
        }
        Ok(())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        if self.class() != other.class() || self.len() != other.len() {
            return false;
        }
        self.property_names().all(|name| {
            match (self.get(name), other.get(name)) {
                (Ok(Some(a)), Ok(Some(b))) => a == b,
                _ => false,
            }
        })
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.class())?;
        let mut map = f.debug_map();
        for (name, slot) in &self.inner.slots {
            match slot.value.get() {
                Some(value) => map.entry(name, value),
                None => map.entry(name, &format_args!("<deferred>")),
            };
        }
        map.finish()
    }
}
