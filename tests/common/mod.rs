// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::DateTime;
use jsoncodec::mapping::{default_decode_loader, default_encode_loader};
use jsoncodec::{
    BackingValue, ClassDefinition, ClassRegistry, CodecConfig, CodecError, EnumDefinition,
    Formatter, FormatterRegistry, JsonDecoder, JsonEncoder, Object, PropertyDefinition,
    ScalarKind, TypeDescriptor, Value,
};

// ============================================================================
// Temporary Directories
// ============================================================================

/// Get a unique temporary directory for a test
fn temp_dir(name: &str) -> PathBuf {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    std::env::temp_dir().join(format!(
        "jsoncodec_{name}_{}_{}",
        std::process::id(),
        random
    ))
}

/// Create a temporary directory with cleanup guard
pub fn temp_path(name: &str) -> (PathBuf, CleanupGuard) {
    let dir = temp_dir(name);
    fs::create_dir_all(&dir).ok();
    let guard = CleanupGuard(dir.clone());
    (dir, guard)
}

/// Cleanup guard for test temporary files
pub struct CleanupGuard(PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Classes and enums shared by the integration tests.
pub fn classes() -> Arc<ClassRegistry> {
    let classes = ClassRegistry::new();

    classes
        .register_enum(
            EnumDefinition::new("Suit", ScalarKind::String)
                .case("Hearts", BackingValue::String("H".into()))
                .case("Spades", BackingValue::String("S".into())),
        )
        .unwrap();
    classes
        .register_enum(
            EnumDefinition::new("Priority", ScalarKind::Int)
                .case("Low", BackingValue::Int(1))
                .case("High", BackingValue::Int(2)),
        )
        .unwrap();

    classes
        .register_class(
            ClassDefinition::new("Dummy")
                .property(PropertyDefinition::new("id", TypeDescriptor::int()).encoded_name("@id"))
                .property(PropertyDefinition::new(
                    "name",
                    TypeDescriptor::nullable(TypeDescriptor::string()),
                ))
                .property(PropertyDefinition::new(
                    "suit",
                    TypeDescriptor::backed_enum("Suit", ScalarKind::String),
                ))
                .property(PropertyDefinition::new(
                    "priority",
                    TypeDescriptor::backed_enum("Priority", ScalarKind::Int),
                ))
                .property(PropertyDefinition::new("created", TypeDescriptor::date_time()))
                .property(PropertyDefinition::new(
                    "tags",
                    TypeDescriptor::list(TypeDescriptor::string()),
                ))
                .property(PropertyDefinition::new(
                    "scores",
                    TypeDescriptor::dict(TypeDescriptor::float()),
                )),
        )
        .unwrap();

    classes
        .register_class(
            ClassDefinition::new("Wrapper")
                .property(PropertyDefinition::new(
                    "items",
                    TypeDescriptor::list(TypeDescriptor::object("Dummy")),
                ))
                .property(PropertyDefinition::new(
                    "by_name",
                    TypeDescriptor::dict(TypeDescriptor::object("Dummy")),
                ))
                .property(PropertyDefinition::new(
                    "choice",
                    TypeDescriptor::union([
                        TypeDescriptor::object("Dummy"),
                        TypeDescriptor::list(TypeDescriptor::int()),
                        TypeDescriptor::null(),
                    ]),
                )),
        )
        .unwrap();

    classes
        .register_class(
            ClassDefinition::new("Price")
                .property(
                    PropertyDefinition::new("amount", TypeDescriptor::float())
                        .encode_formatter("cents.encode")
                        .decode_formatter("cents.decode"),
                )
                .property(PropertyDefinition::new("currency", TypeDescriptor::string())),
        )
        .unwrap();

    classes
        .register_class(
            ClassDefinition::new("Pair")
                .template("K")
                .template("V")
                .property(PropertyDefinition::new("key", TypeDescriptor::object("K")))
                .property(PropertyDefinition::new("value", TypeDescriptor::object("V"))),
        )
        .unwrap();

    classes
        .register_class(
            ClassDefinition::new("Chain")
                .property(PropertyDefinition::new("id", TypeDescriptor::int()))
                .property(PropertyDefinition::new(
                    "next",
                    TypeDescriptor::nullable(TypeDescriptor::object("Chain")),
                )),
        )
        .unwrap();

    classes
        .register_class(
            ClassDefinition::new("Tree")
                .property(PropertyDefinition::new("id", TypeDescriptor::int()))
                .property(
                    PropertyDefinition::new(
                        "child",
                        TypeDescriptor::nullable(TypeDescriptor::object("Tree")),
                    )
                    .max_depth(1, Some("tree.summary")),
                ),
        )
        .unwrap();

    classes
        .register_class(
            ClassDefinition::new("Leaf")
                .property(PropertyDefinition::new("id", TypeDescriptor::int()))
                .property(
                    PropertyDefinition::new(
                        "parent",
                        TypeDescriptor::nullable(TypeDescriptor::object("Leaf")),
                    )
                    .max_depth(1, None),
                ),
        )
        .unwrap();

    Arc::new(classes)
}

// ============================================================================
// Formatters
// ============================================================================

/// Builtin formatters plus the ones the fixture classes use.
pub fn formatters() -> Arc<FormatterRegistry> {
    let formatters = FormatterRegistry::with_builtins().unwrap();

    formatters
        .register(Formatter::new(
            "cents.encode",
            TypeDescriptor::float(),
            TypeDescriptor::int(),
            |args| match &args[0] {
                Value::Float(f) => Ok(Value::Int((f * 100.0).round() as i64)),
                Value::Int(i) => Ok(Value::Int(i * 100)),
                other => Err(CodecError::unexpected_value(format!(
                    "Expected an amount, got \"{}\".",
                    other.kind_name()
                ))),
            },
        ))
        .unwrap();

    formatters
        .register(Formatter::new(
            "cents.decode",
            TypeDescriptor::int(),
            TypeDescriptor::float(),
            |args| match &args[0] {
                Value::Int(i) => Ok(Value::Float(*i as f64 / 100.0)),
                other => Err(CodecError::unexpected_value(format!(
                    "Expected cents, got \"{}\".",
                    other.kind_name()
                ))),
            },
        ))
        .unwrap();

    formatters
        .register(Formatter::new(
            "tree.summary",
            TypeDescriptor::nullable(TypeDescriptor::object("Tree")),
            TypeDescriptor::nullable(TypeDescriptor::string()),
            |args| match &args[0] {
                Value::Object(tree) => {
                    let id = tree.get("id")?.and_then(Value::as_i64).unwrap_or_default();
                    Ok(Value::String(format!("Tree#{id}")))
                }
                _ => Ok(Value::Null),
            },
        ))
        .unwrap();

    Arc::new(formatters)
}

pub fn encoder(dir: &Path, config: CodecConfig) -> JsonEncoder {
    let classes = classes();
    let formatters = formatters();
    let loader = default_encode_loader(classes.clone(), formatters.clone());
    JsonEncoder::new(classes, formatters, loader, dir).with_config(config)
}

pub fn decoder(dir: &Path, config: CodecConfig) -> JsonDecoder {
    let classes = classes();
    let formatters = formatters();
    let loader = default_decode_loader(classes.clone(), formatters.clone());
    JsonDecoder::new(classes, formatters, loader, dir).with_config(config)
}

// ============================================================================
// Sample Values
// ============================================================================

pub fn suit(name: &str, value: &str) -> Value {
    Value::Enum(jsoncodec::EnumCase {
        enum_type: "Suit".into(),
        name: name.into(),
        value: BackingValue::String(value.into()),
    })
}

pub fn priority(name: &str, value: i64) -> Value {
    Value::Enum(jsoncodec::EnumCase {
        enum_type: "Priority".into(),
        name: name.into(),
        value: BackingValue::Int(value),
    })
}

pub fn dummy(id: i64, name: Option<&str>) -> Value {
    let created = DateTime::parse_from_rfc3339("2024-05-01T12:30:00+02:00").unwrap();
    let scores = [
        ("math".to_string(), Value::Float(1.5)),
        ("art".to_string(), Value::Float(2.25)),
    ]
    .into_iter()
    .collect();

    Value::Object(Object::new(
        "Dummy",
        [
            ("id", Value::Int(id)),
            ("name", name.map(Value::from).unwrap_or(Value::Null)),
            ("suit", suit("Spades", "S")),
            ("priority", priority("High", 2)),
            ("created", Value::DateTime(created)),
            ("tags", Value::List(vec![Value::from("a"), Value::from("b,\"c\"")])),
            ("scores", Value::Dict(scores)),
        ],
    ))
}

pub fn wrapper(choice: Value) -> Value {
    let by_name = [
        ("first".to_string(), dummy(1, Some("one"))),
        ("second".to_string(), dummy(2, None)),
    ]
    .into_iter()
    .collect();

    Value::Object(Object::new(
        "Wrapper",
        [
            (
                "items",
                Value::List(vec![dummy(3, Some("three")), dummy(4, None)]),
            ),
            ("by_name", Value::Dict(by_name)),
            ("choice", choice),
        ],
    ))
}

/// Tree of the given depth, ids counting from 1 at the root.
pub fn tree(depth: i64) -> Value {
    (1..=depth).rev().fold(Value::Null, |child, id| {
        Value::Object(Object::new("Tree", [("id", Value::Int(id)), ("child", child)]))
    })
}
