// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lazy stream decoding tests.
//!
//! Tests cover:
//! - Properties decoded on first read, once
//! - Malformed documents rejected with their offset
//! - Decoding from files and chunked input

mod common;

use std::fs;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jsoncodec::mapping::{default_decode_loader, default_encode_loader};
use jsoncodec::{
    parse_type, ClassDefinition, CodecConfig, CodecError, Formatter, JsonDecoder, JsonEncoder,
    MemoryStream, PropertyDefinition, Result, TypeDescriptor, Value,
};

use common::{classes, decoder, formatters, temp_path};

/// Decoder whose `Counted.value` formatter counts its calls.
fn counting_decoder(dir: &std::path::Path) -> (JsonDecoder, Arc<AtomicUsize>) {
    let classes = classes();
    classes
        .register_class(
            ClassDefinition::new("Counted").property(
                PropertyDefinition::new("value", TypeDescriptor::int()).decode_formatter("count"),
            ),
        )
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let formatters = formatters();
    formatters
        .register(Formatter::new(
            "count",
            TypeDescriptor::int(),
            TypeDescriptor::int(),
            move |args| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(args[0].clone())
            },
        ))
        .unwrap();

    let loader = default_decode_loader(classes.clone(), formatters.clone());
    (JsonDecoder::new(classes, formatters, loader, dir), calls)
}

/// Decode and read every top-level property.
fn decode_forced(decoder: &JsonDecoder, json: &str, ty: &str) -> Result<Value> {
    let value = decoder.decode_stream(
        Rc::new(MemoryStream::from(json)),
        &parse_type(ty).unwrap(),
    )?;
    if let Some(object) = value.as_object() {
        object.force()?;
    }
    Ok(value)
}

#[test]
fn test_properties_decoded_once_on_read() {
    let (dir, _guard) = temp_path("stream_once");
    let (decoder, calls) = counting_decoder(&dir);

    let value = decoder
        .decode_stream(
            Rc::new(MemoryStream::from(r#"[{"value":1},{"value":2},{"value":3}]"#)),
            &parse_type("list<Counted>").unwrap(),
        )
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let items = value.as_list().unwrap();
    assert_eq!(items.len(), 3);
    let second = items[1].as_object().unwrap();
    assert_eq!(second.get("value").unwrap(), Some(&Value::Int(2)));
    assert_eq!(second.get("value").unwrap(), Some(&Value::Int(2)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(!items[0].as_object().unwrap().is_initialized("value"));
}

#[test]
fn test_eager_decode_calls_formatters_upfront() {
    let (dir, _guard) = temp_path("stream_eager");
    let (decoder, calls) = counting_decoder(&dir);

    decoder
        .decode_str(
            r#"[{"value":1},{"value":2}]"#,
            &parse_type("list<Counted>").unwrap(),
        )
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_malformed_documents() {
    let (dir, _guard) = temp_path("stream_malformed");
    let decoder = decoder(&dir, CodecConfig::default());

    for (json, ty) in [
        (r#"{"amount":1,"amount":2,"currency":"EUR"}"#, "Price"),
        (r#"{"amount":1,"currency":"EUR",}"#, "Price"),
        (r#"{"amount":,"currency":"EUR"}"#, "Price"),
        ("[1,2", "list<int>"),
        ("[1 2]", "list<int>"),
        (r#"{"a":1} {"b":2}"#, "dict<int>"),
    ] {
        let result = decode_forced(&decoder, json, ty);
        assert!(
            matches!(result, Err(CodecError::InvalidStream { .. })),
            "{json} decoded as {result:?}"
        );
    }
}

#[test]
fn test_malformed_document_same_error_in_both_modes() {
    let (dir, _guard) = temp_path("stream_malformed_modes");
    let decoder = decoder(&dir, CodecConfig::default());

    for (json, ty) in [("[1,2,]", "list<int>"), ("[1 2]", "list<int>"), ("{", "Price")] {
        let eager = decoder.decode_str(json, &parse_type(ty).unwrap());
        let lazy = decode_forced(&decoder, json, ty);
        assert!(
            matches!(eager, Err(ref e) if e.is_stream_error()),
            "{json} decoded eagerly as {eager:?}"
        );
        assert!(
            matches!(lazy, Err(ref e) if e.is_stream_error()),
            "{json} decoded lazily as {lazy:?}"
        );
    }
}

#[test]
fn test_type_mismatch_reported_on_read() {
    let (dir, _guard) = temp_path("stream_mismatch");
    let decoder = decoder(&dir, CodecConfig::default());

    let value = decoder
        .decode_stream(
            Rc::new(MemoryStream::from(r#"{"amount":"ten","currency":"EUR"}"#)),
            &parse_type("Price").unwrap(),
        )
        .unwrap();
    let price = value.as_object().unwrap();
    assert_eq!(price.get("currency").unwrap(), Some(&Value::from("EUR")));
    assert!(price.get("amount").is_err());
}

#[test]
fn test_decode_file_lazily() {
    let (dir, _guard) = temp_path("stream_file");
    let (decoder, calls) = counting_decoder(&dir);
    let path = dir.join("counted.json");
    fs::write(&path, r#"{"first": {"value": 10}, "second": {"value": 20}}"#).unwrap();

    let value = decoder
        .decode_file(&path, &parse_type("dict<Counted>").unwrap())
        .unwrap();
    let dict = value.as_dict().unwrap();
    assert_eq!(dict.keys().collect::<Vec<_>>(), ["first", "second"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let second = dict["second"].as_object().unwrap();
    assert_eq!(second.get("value").unwrap(), Some(&Value::Int(20)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_missing_file() {
    let (dir, _guard) = temp_path("stream_missing");
    let decoder = decoder(&dir, CodecConfig::default());
    let result = decoder.decode_file(dir.join("absent.json"), &parse_type("Dummy").unwrap());
    assert!(matches!(result, Err(CodecError::Io { .. })));
}

#[test]
fn test_chunks_split_inside_tokens() {
    let (dir, _guard) = temp_path("stream_chunks");
    let decoder = decoder(&dir, CodecConfig::default());
    let ty = parse_type("list<Price>").unwrap();
    let json = r#"[{"amount":1999,"currency":"EUR"},{"amount":5,"currency":"JPY"}]"#;

    let chunks = json.as_bytes().chunks(3).map(<[u8]>::to_vec);
    let lazy = decoder.decode_chunks(chunks, &ty).unwrap();
    assert_eq!(lazy, decoder.decode_str(json, &ty).unwrap());

    let first = lazy.as_list().unwrap()[0].as_object().unwrap().get("amount").unwrap().cloned();
    assert_eq!(first, Some(Value::Float(19.99)));
}

#[test]
fn test_lazy_object_keeps_declaration_order() {
    let (dir, _guard) = temp_path("stream_order");
    let classes = classes();
    classes
        .register_class(
            ClassDefinition::new("Point")
                .property(PropertyDefinition::new("x", TypeDescriptor::int()))
                .property(PropertyDefinition::new("y", TypeDescriptor::int())),
        )
        .unwrap();
    let formatters = formatters();
    let decoder = JsonDecoder::new(
        classes.clone(),
        formatters.clone(),
        default_decode_loader(classes.clone(), formatters.clone()),
        &dir,
    );
    let encoder = JsonEncoder::new(
        classes.clone(),
        formatters.clone(),
        default_encode_loader(classes, formatters),
        &dir,
    );

    let ty = parse_type("Point").unwrap();
    let json = r#"{"y":2,"x":1}"#;
    let eager = decoder.decode_str(json, &ty).unwrap();
    let lazy = decoder
        .decode_stream(Rc::new(MemoryStream::from(json)), &ty)
        .unwrap();

    let eager_text = encoder.encode_to_string(&eager, &ty).unwrap();
    let lazy_text = encoder.encode_to_string(&lazy, &ty).unwrap();
    assert_eq!(eager_text, r#"{"x":1,"y":2}"#);
    assert_eq!(lazy_text, eager_text);
}
