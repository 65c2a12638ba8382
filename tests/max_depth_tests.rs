// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Nesting limit tests for self-referencing classes.

mod common;

use jsoncodec::{parse_type, CodecConfig, CodecError, Mode, Object, Value};
use serde_json::json;

use common::{decoder, encoder, temp_path, tree};

fn leaf(depth: i64) -> Value {
    (1..=depth).rev().fold(Value::Null, |parent, id| {
        Value::Object(Object::new("Leaf", [("id", Value::Int(id)), ("parent", parent)]))
    })
}

#[test]
fn test_unbounded_recursion_fails() {
    let (dir, _guard) = temp_path("depth_chain");
    let encoder = encoder(&dir, CodecConfig::default().with_max_depth(2));
    let ty = parse_type("Chain").unwrap();

    match encoder.generate(&ty, Mode::String) {
        Err(CodecError::MaxDepth { class, limit }) => {
            assert_eq!(class, "Chain");
            assert_eq!(limit, 2);
        }
        other => panic!("expected max depth error, got {other:?}"),
    }
}

#[test]
fn test_unbounded_recursion_decodes() {
    // Decode graphs close cycles instead of unrolling them.
    let (dir, _guard) = temp_path("depth_chain_decode");
    let decoder = decoder(&dir, CodecConfig::default().with_max_depth(2));
    let ty = parse_type("Chain").unwrap();

    let value = decoder
        .decode_str(r#"{"id":1,"next":{"id":2,"next":{"id":3,"next":null}}}"#, &ty)
        .unwrap();
    let third = value.as_object().unwrap().get("next").unwrap().unwrap();
    let third = third.as_object().unwrap().get("next").unwrap().unwrap();
    assert_eq!(
        third.as_object().unwrap().get("id").unwrap(),
        Some(&Value::Int(3))
    );
}

#[test]
fn test_fallback_formatter_past_limit() {
    let (dir, _guard) = temp_path("depth_fallback");
    let encoder = encoder(&dir, CodecConfig::default());
    let ty = parse_type("Tree").unwrap();

    let text = encoder.encode_to_string(&tree(3), &ty).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, json!({"id": 1, "child": {"id": 2, "child": "Tree#3"}}));

    let shallow = encoder.encode_to_string(&tree(1), &ty).unwrap();
    let json: serde_json::Value = serde_json::from_str(&shallow).unwrap();
    assert_eq!(json, json!({"id": 1, "child": null}));
}

#[test]
fn test_fallback_receives_null() {
    let (dir, _guard) = temp_path("depth_fallback_null");
    let encoder = encoder(&dir, CodecConfig::default());

    let text = encoder
        .encode_to_string(&tree(2), &parse_type("Tree").unwrap())
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, json!({"id": 1, "child": {"id": 2, "child": null}}));
}

#[test]
fn test_property_dropped_past_limit() {
    let (dir, _guard) = temp_path("depth_drop");
    let encoder = encoder(&dir, CodecConfig::default());

    let text = encoder
        .encode_to_string(&leaf(3), &parse_type("Leaf").unwrap())
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, json!({"id": 1, "parent": {"id": 2}}));
}

#[test]
fn test_limit_applies_per_collection_item() {
    let (dir, _guard) = temp_path("depth_list");
    let encoder = encoder(&dir, CodecConfig::default());

    let text = encoder
        .encode_to_string(
            &Value::List(vec![tree(3), tree(1)]),
            &parse_type("list<Tree>").unwrap(),
        )
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        json,
        json!([
            {"id": 1, "child": {"id": 2, "child": "Tree#3"}},
            {"id": 1, "child": null}
        ])
    );
}
