// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Accessor expressions.
//!
//! An [`Accessor`] says where a value comes from: a bound variable, a
//! literal, a property of another value, or a call. Builders compose them
//! symbolically; plans store them; [`Scope::eval`] evaluates them against
//! the data being encoded or decoded.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{CodecError, Result, Value};
use crate::mapping::{Formatter, FormatterRegistry, ServiceLocator, CONFIG_PARAMETER};

/// Variable holding the codec configuration.
pub const CONFIG_VARIABLE: &str = "config";

/// Variable holding the runtime service locator.
pub const SERVICES_VARIABLE: &str = "services";

/// Variable holding the root value being encoded.
pub const DATA_VARIABLE: &str = "data";

/// Opaque expression standing for the raw decoded value of a property.
pub const RAW_VALUE: &str = "value";

const SERVICE_GETTER: &str = "get";

/// Symbolic description of a value's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessor {
    /// A named variable
    Variable(String),
    /// A constant
    Literal(serde_json::Value),
    /// Property (or dict key) of another value
    PropertyOf(Box<Accessor>, String),
    /// Function call, or method call when a receiver is given
    Call {
        function: String,
        args: Vec<Accessor>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<Box<Accessor>>,
    },
    /// Backend expression, bound by the executor
    Opaque(String),
}

impl Accessor {
    pub fn variable(name: impl Into<String>) -> Self {
        Accessor::Variable(name.into())
    }

    pub fn property(self, name: impl Into<String>) -> Self {
        Accessor::PropertyOf(Box::new(self), name.into())
    }

    pub fn call(function: impl Into<String>, args: Vec<Accessor>) -> Self {
        Accessor::Call {
            function: function.into(),
            args,
            receiver: None,
        }
    }

    /// `services.get("<id>")`.
    pub fn service(id: impl Into<String>) -> Self {
        Accessor::Call {
            function: SERVICE_GETTER.to_string(),
            args: vec![Accessor::Literal(serde_json::Value::String(id.into()))],
            receiver: Some(Box::new(Accessor::variable(SERVICES_VARIABLE))),
        }
    }

    /// Wrap this accessor in a call to `formatter`.
    ///
    /// The value is the first argument; `config` binds the configuration
    /// and every other parameter must be a known runtime service.
    pub fn format(self, formatter: &Formatter, services: &dyn ServiceLocator) -> Result<Self> {
        let mut args = Vec::with_capacity(formatter.params().len() + 1);
        args.push(self);

        for param in formatter.params() {
            if param == CONFIG_PARAMETER {
                args.push(Accessor::variable(CONFIG_VARIABLE));
                continue;
            }

            let id = formatter.service_id(param);
            if !services.has(&id) {
                return Err(CodecError::configuration(
                    format!("{}()", formatter.name()),
                    format!(
                        "Cannot resolve \"{param}\" argument of \"{}()\".",
                        formatter.name()
                    ),
                ));
            }
            args.push(Accessor::service(id));
        }

        Ok(Accessor::call(formatter.name(), args))
    }

    /// Apply a chain of formatters, in order.
    pub fn format_chain(
        self,
        names: &[String],
        formatters: &FormatterRegistry,
        services: &dyn ServiceLocator,
    ) -> Result<Self> {
        names.iter().try_fold(self, |accessor, name| {
            accessor.format(&formatters.get(name)?, services)
        })
    }

    pub fn has_call(&self) -> bool {
        match self {
            Accessor::Call { .. } => true,
            Accessor::PropertyOf(target, _) => target.has_call(),
            _ => false,
        }
    }
}

/// Execution-wide collaborators.
#[derive(Clone, Copy)]
pub struct Runtime<'a> {
    pub config: &'a Value,
    pub services: &'a dyn ServiceLocator,
    pub formatters: &'a FormatterRegistry,
}

/// Variable bindings for accessor evaluation.
#[derive(Clone)]
pub struct Scope<'a> {
    runtime: Runtime<'a>,
    bindings: HashMap<String, Cow<'a, Value>>,
}

impl<'a> Scope<'a> {
    pub fn new(runtime: Runtime<'a>) -> Self {
        Self {
            runtime,
            bindings: HashMap::new(),
        }
    }

    pub fn runtime(&self) -> Runtime<'a> {
        self.runtime
    }

    /// Bind a variable, replacing any earlier binding of the same name.
    pub fn bind(&mut self, name: impl Into<String>, value: Cow<'a, Value>) {
        self.bindings.insert(name.into(), value);
    }

    fn lookup(&self, name: &str) -> Result<Cow<'a, Value>> {
        if name == CONFIG_VARIABLE {
            return Ok(Cow::Borrowed(self.runtime.config));
        }
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::Other(format!("unbound variable \"{name}\"")))
    }

    pub fn eval(&self, accessor: &Accessor) -> Result<Cow<'a, Value>> {
        match accessor {
            Accessor::Variable(name) | Accessor::Opaque(name) => self.lookup(name),
            Accessor::Literal(json) => Ok(Cow::Owned(Value::from_json(json.clone()))),
            Accessor::PropertyOf(target, name) => match self.eval(target)? {
                Cow::Borrowed(value) => property_of(value, name),
                Cow::Owned(value) => property_of(&value, name).map(|v| Cow::Owned(v.into_owned())),
            },
            Accessor::Call {
                function,
                args,
                receiver: Some(receiver),
            } => {
                if function != SERVICE_GETTER
                    || **receiver != Accessor::variable(SERVICES_VARIABLE)
                {
                    return Err(CodecError::unsupported_type(format!(
                        "method call \"{function}()\""
                    )));
                }
                let id = match args.first() {
                    Some(Accessor::Literal(serde_json::Value::String(id))) => id,
                    _ => return Err(CodecError::Other("service id must be a string literal".into())),
                };
                self.runtime.services.get(id).map(Cow::Owned).ok_or_else(|| {
                    CodecError::configuration(id.as_str(), "service is not registered")
                })
            }
            Accessor::Call {
                function,
                args,
                receiver: None,
            } => {
                let formatter = self.runtime.formatters.get(function)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg).map(Cow::into_owned))
                    .collect::<Result<Vec<_>>>()?;
                formatter.call(&args).map(Cow::Owned)
            }
        }
    }
}

fn property_of<'v>(value: &'v Value, name: &str) -> Result<Cow<'v, Value>> {
    let missing = || {
        CodecError::unexpected_value(format!(
            "Missing \"{name}\" on \"{}\" value.",
            value.kind_name()
        ))
    };

    match value {
        Value::Object(object) => object.get(name)?.map(Cow::Borrowed).ok_or_else(missing),
        Value::Dict(entries) => entries.get(name).map(Cow::Borrowed).ok_or_else(missing),
        Value::Enum(case) => match name {
            "value" => Ok(Cow::Owned(case.value.to_value())),
            "name" => Ok(Cow::Owned(Value::String(case.name.clone()))),
            _ => Err(missing()),
        },
        _ => Err(missing()),
    }
}
