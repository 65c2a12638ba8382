// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Round-trip integration tests.
//!
//! Tests cover:
//! - Encoding through string, stream and resource plans
//! - Decoding eagerly from strings and lazily from streams and files
//! - Renamed properties, formatters, enums and date-times
//! - Unions, collections of objects and generic classes

mod common;

use std::fs;
use std::io::Write;
use std::rc::Rc;

use jsoncodec::{
    parse_type, CodecConfig, CodecError, MemoryStream, Object, TypeDescriptor, Value,
};
use serde_json::json;

use common::{decoder, dummy, encoder, temp_path, wrapper};

fn parse(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap()
}

fn dummy_json(id: i64, name: Option<&str>) -> serde_json::Value {
    json!({
        "@id": id,
        "name": name,
        "suit": "S",
        "priority": 2,
        "created": "2024-05-01T12:30:00+02:00",
        "tags": ["a", "b,\"c\""],
        "scores": {"math": 1.5, "art": 2.25}
    })
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_encode_object_all_modes() {
    let (dir, _guard) = temp_path("encode_modes");
    let encoder = encoder(&dir, CodecConfig::default());
    let ty = parse_type("Dummy").unwrap();
    let data = dummy(1, Some("foo"));

    let text = encoder.encode_to_string(&data, &ty).unwrap();
    assert_eq!(parse(&text), dummy_json(1, Some("foo")));

    let mut stream = MemoryStream::new();
    encoder.encode_to_stream(&data, &ty, &mut stream).unwrap();
    assert_eq!(stream.as_bytes(), text.as_bytes());

    let path = dir.join("dummy.json");
    let mut file = fs::File::create(&path).unwrap();
    encoder.encode_to_writer(&data, &ty, &mut file).unwrap();
    file.flush().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_encode_null_property() {
    let (dir, _guard) = temp_path("encode_null");
    let encoder = encoder(&dir, CodecConfig::default());
    let text = encoder
        .encode_to_string(&dummy(7, None), &parse_type("Dummy").unwrap())
        .unwrap();
    assert_eq!(parse(&text)["name"], serde_json::Value::Null);
}

#[test]
fn test_encode_collections_of_objects() {
    let (dir, _guard) = temp_path("encode_collections");
    let encoder = encoder(&dir, CodecConfig::default());
    let ty = parse_type("Wrapper").unwrap();

    let text = encoder
        .encode_to_string(&wrapper(Value::List(vec![Value::Int(1), Value::Int(2)])), &ty)
        .unwrap();
    assert_eq!(
        parse(&text),
        json!({
            "items": [dummy_json(3, Some("three")), dummy_json(4, None)],
            "by_name": {"first": dummy_json(1, Some("one")), "second": dummy_json(2, None)},
            "choice": [1, 2]
        })
    );
}

#[test]
fn test_encode_union_branches() {
    let (dir, _guard) = temp_path("encode_union");
    let encoder = encoder(&dir, CodecConfig::default());
    let ty = parse_type("Wrapper").unwrap();

    let object = encoder
        .encode_to_string(&wrapper(dummy(9, Some("nine"))), &ty)
        .unwrap();
    assert_eq!(parse(&object)["choice"], dummy_json(9, Some("nine")));

    let null = encoder.encode_to_string(&wrapper(Value::Null), &ty).unwrap();
    assert_eq!(parse(&null)["choice"], serde_json::Value::Null);
}

#[test]
fn test_encode_formatter_and_root_scalars() {
    let (dir, _guard) = temp_path("encode_formatter");
    let encoder = encoder(&dir, CodecConfig::default());

    let price = Value::Object(Object::new(
        "Price",
        [("amount", Value::Float(12.5)), ("currency", Value::from("EUR"))],
    ));
    let text = encoder
        .encode_to_string(&price, &parse_type("Price").unwrap())
        .unwrap();
    assert_eq!(parse(&text), json!({"amount": 1250, "currency": "EUR"}));

    let list = encoder
        .encode_to_string(
            &Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)]),
            &parse_type("list<int|null>").unwrap(),
        )
        .unwrap();
    assert_eq!(parse(&list), json!([1, null, 3]));

    let text = encoder
        .encode_to_string(&Value::from("a \"quoted\" string"), &TypeDescriptor::string())
        .unwrap();
    assert_eq!(text, r#""a \"quoted\" string""#);
}

#[test]
fn test_encode_generic_class() {
    let (dir, _guard) = temp_path("encode_generic");
    let encoder = encoder(&dir, CodecConfig::default());
    let ty = parse_type("Pair<string, int>").unwrap();

    let pair = Value::Object(Object::new(
        "Pair",
        [("key", Value::from("answer")), ("value", Value::Int(42))],
    ));
    let text = encoder.encode_to_string(&pair, &ty).unwrap();
    assert_eq!(parse(&text), json!({"key": "answer", "value": 42}));
}

#[test]
fn test_encode_custom_date_time_format() {
    let (dir, _guard) = temp_path("encode_date_format");
    let encoder = encoder(
        &dir,
        CodecConfig::default().with_date_time_format("%Y-%m-%d %H:%M %z"),
    );
    let text = encoder
        .encode_to_string(&dummy(1, None), &parse_type("Dummy").unwrap())
        .unwrap();
    assert_eq!(parse(&text)["created"], json!("2024-05-01 12:30 +0200"));
}

#[test]
fn test_encode_invalid_date_time_format() {
    let (dir, _guard) = temp_path("encode_bad_date_format");
    let encoder = encoder(&dir, CodecConfig::default().with_date_time_format("%Q"));
    let result = encoder.encode_to_string(&dummy(1, None), &parse_type("Dummy").unwrap());
    assert!(matches!(result, Err(CodecError::Configuration { .. })));
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_round_trip_string() {
    let (dir, _guard) = temp_path("round_trip_string");
    let encoder = encoder(&dir, CodecConfig::default());
    let decoder = decoder(&dir, CodecConfig::default());
    let ty = parse_type("Wrapper").unwrap();

    for choice in [
        dummy(5, Some("five")),
        Value::List(vec![Value::Int(4), Value::Int(2)]),
        Value::Null,
    ] {
        let data = wrapper(choice);
        let text = encoder.encode_to_string(&data, &ty).unwrap();
        let decoded = decoder.decode_str(&text, &ty).unwrap();
        assert_eq!(decoded, data);
    }
}

#[test]
fn test_round_trip_stream() {
    let (dir, _guard) = temp_path("round_trip_stream");
    let encoder = encoder(&dir, CodecConfig::default());
    let decoder = decoder(&dir, CodecConfig::default());
    let ty = parse_type("list<Dummy>").unwrap();

    let data = Value::List(vec![dummy(1, Some("one")), dummy(2, None)]);
    let mut stream = MemoryStream::new();
    encoder.encode_to_stream(&data, &ty, &mut stream).unwrap();

    let decoded = decoder.decode_stream(Rc::new(stream), &ty).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn test_round_trip_file() {
    let (dir, _guard) = temp_path("round_trip_file");
    let encoder = encoder(&dir, CodecConfig::default());
    let decoder = decoder(&dir, CodecConfig::default());
    let ty = parse_type("dict<Dummy>").unwrap();

    let data = Value::Dict(
        [
            ("x".to_string(), dummy(1, Some("one"))),
            ("y".to_string(), dummy(2, Some("two"))),
        ]
        .into_iter()
        .collect(),
    );

    let path = dir.join("dummies.json");
    let mut file = fs::File::create(&path).unwrap();
    encoder.encode_to_writer(&data, &ty, &mut file).unwrap();
    drop(file);

    let decoded = decoder.decode_file(&path, &ty).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn test_round_trip_formatter_and_generic() {
    let (dir, _guard) = temp_path("round_trip_formatter");
    let encoder = encoder(&dir, CodecConfig::default());
    let decoder = decoder(&dir, CodecConfig::default());

    let price_ty = parse_type("Price").unwrap();
    let price = Value::Object(Object::new(
        "Price",
        [("amount", Value::Float(0.75)), ("currency", Value::from("USD"))],
    ));
    let text = encoder.encode_to_string(&price, &price_ty).unwrap();
    assert_eq!(decoder.decode_str(&text, &price_ty).unwrap(), price);

    let pair_ty = parse_type("Pair<Dummy, list<int>>").unwrap();
    let pair = Value::Object(Object::new(
        "Pair",
        [
            ("key", dummy(3, None)),
            ("value", Value::List(vec![Value::Int(1), Value::Int(2)])),
        ],
    ));
    let text = encoder.encode_to_string(&pair, &pair_ty).unwrap();
    let decoded = decoder
        .decode_stream(Rc::new(MemoryStream::from(text.as_str())), &pair_ty)
        .unwrap();
    assert_eq!(decoded, pair);
}

#[test]
fn test_decode_ignores_unknown_keys() {
    let (dir, _guard) = temp_path("decode_unknown_keys");
    let decoder = decoder(&dir, CodecConfig::default());
    let ty = parse_type("Price").unwrap();
    let json = r#"{"currency":"EUR","rate":{"nested":[1,2,3]},"amount":250}"#;

    let expected = Value::Object(Object::new(
        "Price",
        [("amount", Value::Float(2.5)), ("currency", Value::from("EUR"))],
    ));
    assert_eq!(decoder.decode_str(json, &ty).unwrap(), expected);
    let lazy = decoder
        .decode_stream(Rc::new(MemoryStream::from(json)), &ty)
        .unwrap();
    assert_eq!(lazy, expected);
}
