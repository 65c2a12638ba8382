// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Named formatter functions.
//!
//! Properties refer to formatters by name, and plans store only those names,
//! so a cached plan is resolved against the registry at execution time.
//! A formatter receives the value first, then one argument per declared
//! parameter: `config` binds the codec configuration, any other name is
//! looked up as the runtime service `"<formatter>[<param>]"`.

use std::fmt::{self, Write};
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};

use crate::core::{CodecError, Result, TypeRegistry, Value};
use crate::schema::TypeDescriptor;

/// Builtin formatter writing date-times as strings.
pub const DATE_TIME_TO_STRING: &str = "date_time.to_string";

/// Builtin formatter reading date-times from strings.
pub const DATE_TIME_FROM_STRING: &str = "date_time.from_string";

/// Name of the parameter bound to the codec configuration.
pub const CONFIG_PARAMETER: &str = "config";

/// Formatter implementation.
pub type FormatterFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A named formatter with its signature.
#[derive(Clone)]
pub struct Formatter {
    name: String,
    params: Vec<String>,
    input: TypeDescriptor,
    output: TypeDescriptor,
    func: FormatterFn,
}

impl Formatter {
    /// Create a formatter taking only the value.
    pub fn new<F>(
        name: impl Into<String>,
        input: TypeDescriptor,
        output: TypeDescriptor,
        func: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            input,
            output,
            func: Arc::new(func),
        }
    }

    /// Declare an extra parameter after the value.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extra parameters, in call order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Type of the value argument.
    pub fn input(&self) -> &TypeDescriptor {
        &self.input
    }

    /// Type of the result.
    pub fn output(&self) -> &TypeDescriptor {
        &self.output
    }

    /// Service identifier an extra parameter resolves to.
    pub fn service_id(&self, param: &str) -> String {
        format!("{}[{param}]", self.name)
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        let expected = self.params.len() + 1;
        if args.len() != expected {
            return Err(CodecError::configuration(
                format!("{}()", self.name),
                format!("expected {expected} arguments, got {}", args.len()),
            ));
        }
        (self.func)(args)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("input", &self.input.to_string())
            .field("output", &self.output.to_string())
            .finish()
    }
}

/// Registry of formatters by name.
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: TypeRegistry<Formatter>,
}

impl FormatterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the builtin date-time formatters.
    pub fn with_builtins() -> Result<Self> {
        let registry = Self::new();
        registry.register(date_time_to_string())?;
        registry.register(date_time_from_string())?;
        Ok(registry)
    }

    pub fn register(&self, formatter: Formatter) -> Result<()> {
        self.formatters
            .register(formatter.name.clone(), formatter)
    }

    /// Formatter by name; unknown names are a configuration error.
    pub fn get(&self, name: &str) -> Result<Formatter> {
        self.formatters.get(name)?.ok_or_else(|| {
            CodecError::configuration(format!("{name}()"), "formatter is not registered")
        })
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        self.formatters.contains(name)
    }
}

fn date_time_format(config: &Value) -> Option<&str> {
    config
        .as_dict()
        .and_then(|c| c.get("date_time_format"))
        .and_then(Value::as_str)
}

fn invalid_format(formatter: &str, format: &str) -> CodecError {
    CodecError::configuration(
        format!("{formatter}()"),
        format!("Invalid date-time format \"{format}\"."),
    )
}

/// Parsed strftime items, rejecting unknown specifiers.
fn format_items<'a>(formatter: &str, format: &'a str) -> Result<Vec<Item<'a>>> {
    let items: Vec<Item<'a>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(invalid_format(formatter, format));
    }
    Ok(items)
}

fn format_date_time(dt: &DateTime<FixedOffset>, format: &str) -> Result<String> {
    let items = format_items(DATE_TIME_TO_STRING, format)?;
    let mut out = String::new();
    write!(out, "{}", dt.format_with_items(items.iter()))
        .map_err(|_| invalid_format(DATE_TIME_TO_STRING, format))?;
    Ok(out)
}

fn date_time_to_string() -> Formatter {
    Formatter::new(
        DATE_TIME_TO_STRING,
        TypeDescriptor::nullable(TypeDescriptor::date_time()),
        TypeDescriptor::nullable(TypeDescriptor::string()),
        |args| match &args[0] {
            Value::DateTime(dt) => Ok(Value::String(match date_time_format(&args[1]) {
                Some(format) => format_date_time(dt, format)?,
                None => dt.to_rfc3339(),
            })),
            Value::Null => Ok(Value::Null),
            other => Err(CodecError::unexpected_value(format!(
                "Expected a date-time, got \"{}\".",
                other.kind_name()
            ))),
        },
    )
    .param(CONFIG_PARAMETER)
}

fn date_time_from_string() -> Formatter {
    Formatter::new(
        DATE_TIME_FROM_STRING,
        TypeDescriptor::nullable(TypeDescriptor::string()),
        TypeDescriptor::nullable(TypeDescriptor::date_time()),
        |args| match &args[0] {
            Value::String(s) => {
                let parsed = match date_time_format(&args[1]) {
                    Some(format) => {
                        format_items(DATE_TIME_FROM_STRING, format)?;
                        DateTime::parse_from_str(s, format)
                            .or_else(|_| DateTime::parse_from_rfc3339(s))
                    }
                    None => DateTime::parse_from_rfc3339(s),
                };
                parsed.map(Value::DateTime).map_err(|e| {
                    CodecError::unexpected_value(format!(
                        "Cannot parse \"{s}\" as a date-time: {e}."
                    ))
                })
            }
            Value::Null => Ok(Value::Null),
            other => Err(CodecError::unexpected_value(format!(
                "Expected a date-time string, got \"{}\".",
                other.kind_name()
            ))),
        },
    )
    .param(CONFIG_PARAMETER)
}
