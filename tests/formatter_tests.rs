// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Formatter and service integration tests.

mod common;

use std::rc::Rc;
use std::sync::Arc;

use chrono::DateTime;
use jsoncodec::mapping::{default_decode_loader, default_encode_loader};
use jsoncodec::{
    parse_type, ClassDefinition, ClassRegistry, CodecConfig, CodecError, Formatter,
    FormatterRegistry, JsonDecoder, JsonEncoder, MemoryStream, Object, PropertyDefinition,
    ServiceMap, TypeDescriptor, Value,
};
use serde_json::json;

use common::{classes, formatters, temp_path};

fn invoice_fixtures() -> (Arc<ClassRegistry>, Arc<FormatterRegistry>) {
    let classes = classes();
    classes
        .register_class(
            ClassDefinition::new("Invoice")
                .property(
                    PropertyDefinition::new("total", TypeDescriptor::float())
                        .encode_formatter("price.format")
                        .decode_formatter("price.parse"),
                )
                .property(PropertyDefinition::new("number", TypeDescriptor::int())),
        )
        .unwrap();

    let formatters = formatters();
    formatters
        .register(
            Formatter::new(
                "price.format",
                TypeDescriptor::float(),
                TypeDescriptor::string(),
                |args| {
                    let amount = args[0].as_f64().unwrap_or_default();
                    let currency = args[1].as_str().unwrap_or_default();
                    Ok(Value::String(format!("{amount:.2} {currency}")))
                },
            )
            .param("currency"),
        )
        .unwrap();
    formatters
        .register(
            Formatter::new(
                "price.parse",
                TypeDescriptor::string(),
                TypeDescriptor::float(),
                |args| {
                    let text = args[0].as_str().unwrap_or_default();
                    let currency = args[1].as_str().unwrap_or_default();
                    let amount = text
                        .strip_suffix(currency)
                        .map(str::trim)
                        .and_then(|amount| amount.parse::<f64>().ok())
                        .ok_or_else(|| {
                            CodecError::unexpected_value(format!(
                                "\"{text}\" is not a {currency} price."
                            ))
                        })?;
                    Ok(Value::Float(amount))
                },
            )
            .param("currency"),
        )
        .unwrap();

    (classes, formatters)
}

fn services() -> Rc<ServiceMap> {
    Rc::new(
        ServiceMap::new()
            .with("price.format[currency]", Value::from("EUR"))
            .with("price.parse[currency]", Value::from("EUR")),
    )
}

fn invoice(total: f64) -> Value {
    Value::Object(Object::new(
        "Invoice",
        [("total", Value::Float(total)), ("number", Value::Int(17))],
    ))
}

#[test]
fn test_service_argument() {
    let (dir, _guard) = temp_path("formatter_service");
    let (classes, formatters) = invoice_fixtures();
    let loader = default_encode_loader(classes.clone(), formatters.clone());
    let encoder = JsonEncoder::new(classes, formatters, loader, &dir).with_services(services());

    let text = encoder
        .encode_to_string(&invoice(12.5), &parse_type("Invoice").unwrap())
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, json!({"total": "12.50 EUR", "number": 17}));
}

#[test]
fn test_service_round_trip() {
    let (dir, _guard) = temp_path("formatter_round_trip");
    let (classes, formatters) = invoice_fixtures();
    let encoder = JsonEncoder::new(
        classes.clone(),
        formatters.clone(),
        default_encode_loader(classes.clone(), formatters.clone()),
        &dir,
    )
    .with_services(services());
    let decoder = JsonDecoder::new(
        classes.clone(),
        formatters.clone(),
        default_decode_loader(classes, formatters),
        &dir,
    )
    .with_services(services());

    let ty = parse_type("list<Invoice>").unwrap();
    let data = Value::List(vec![invoice(3.25), invoice(100.0)]);
    let text = encoder.encode_to_string(&data, &ty).unwrap();

    assert_eq!(decoder.decode_str(&text, &ty).unwrap(), data);
    assert_eq!(
        decoder
            .decode_chunks([text.into_bytes()], &ty)
            .unwrap(),
        data
    );
}

#[test]
fn test_missing_service() {
    let (dir, _guard) = temp_path("formatter_missing_service");
    let (classes, formatters) = invoice_fixtures();
    let loader = default_encode_loader(classes.clone(), formatters.clone());
    let encoder = JsonEncoder::new(classes, formatters, loader, &dir);

    let err = encoder
        .encode_to_string(&invoice(1.0), &parse_type("Invoice").unwrap())
        .unwrap_err();
    match err {
        CodecError::Configuration { subject, message } => {
            assert_eq!(subject, "price.format()");
            assert_eq!(
                message,
                "Cannot resolve \"currency\" argument of \"price.format()\"."
            );
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_formatter_error_surfaces() {
    let (dir, _guard) = temp_path("formatter_error");
    let (classes, formatters) = invoice_fixtures();
    let loader = default_decode_loader(classes.clone(), formatters.clone());
    let decoder = JsonDecoder::new(classes, formatters, loader, &dir).with_services(services());

    let result = decoder.decode_str(
        r#"{"total":"3 USD","number":1}"#,
        &parse_type("Invoice").unwrap(),
    );
    assert!(matches!(result, Err(CodecError::UnexpectedValue { .. })));
}

#[test]
fn test_unregistered_formatter() {
    let (dir, _guard) = temp_path("formatter_unregistered");
    let classes = classes();
    classes
        .register_class(ClassDefinition::new("Broken").property(
            PropertyDefinition::new("id", TypeDescriptor::int()).encode_formatter("missing"),
        ))
        .unwrap();
    let formatters = formatters();
    let loader = default_encode_loader(classes.clone(), formatters.clone());
    let encoder = JsonEncoder::new(classes, formatters, loader, &dir)
        .with_config(CodecConfig::default());

    let result = encoder.encode_to_string(
        &Value::Object(Object::new("Broken", [("id", Value::Int(1))])),
        &parse_type("Broken").unwrap(),
    );
    assert!(matches!(result, Err(CodecError::Configuration { .. })));
}

fn date_time_fixtures() -> (Arc<ClassRegistry>, Arc<FormatterRegistry>) {
    let classes = classes();
    classes
        .register_class(
            ClassDefinition::new("Stamped").property(
                PropertyDefinition::new("at", TypeDescriptor::date_time())
                    .encode_formatter("stamp.encode")
                    .decode_formatter("stamp.decode"),
            ),
        )
        .unwrap();
    classes
        .register_class(
            ClassDefinition::new("Box")
                .template("T")
                .property(PropertyDefinition::new("content", TypeDescriptor::object("T"))),
        )
        .unwrap();

    let formatters = formatters();
    formatters
        .register(Formatter::new(
            "stamp.encode",
            TypeDescriptor::string(),
            TypeDescriptor::string(),
            |args| match &args[0] {
                Value::String(s) => Ok(Value::String(format!("at {s}"))),
                other => Err(CodecError::unexpected_value(format!(
                    "Expected a string, got \"{}\".",
                    other.kind_name()
                ))),
            },
        ))
        .unwrap();
    formatters
        .register(Formatter::new(
            "stamp.decode",
            TypeDescriptor::string(),
            TypeDescriptor::string(),
            |args| {
                let text = args[0].as_str().unwrap_or_default();
                text.strip_prefix("at ")
                    .map(Value::from)
                    .ok_or_else(|| CodecError::unexpected_value(format!("\"{text}\" is not a stamp.")))
            },
        ))
        .unwrap();

    (classes, formatters)
}

fn date_time_codecs(dir: &std::path::Path) -> (JsonEncoder, JsonDecoder) {
    let (classes, formatters) = date_time_fixtures();
    let encoder = JsonEncoder::new(
        classes.clone(),
        formatters.clone(),
        default_encode_loader(classes.clone(), formatters.clone()),
        dir,
    );
    let decoder = JsonDecoder::new(
        classes.clone(),
        formatters.clone(),
        default_decode_loader(classes, formatters),
        dir,
    );
    (encoder, decoder)
}

fn created() -> Value {
    Value::DateTime(DateTime::parse_from_rfc3339("2024-05-01T12:30:00+02:00").unwrap())
}

#[test]
fn test_formatter_on_date_time_sees_string() {
    let (dir, _guard) = temp_path("formatter_date_time");
    let (encoder, decoder) = date_time_codecs(&dir);
    let ty = parse_type("Stamped").unwrap();
    let stamped = Value::Object(Object::new("Stamped", [("at", created())]));

    let text = encoder.encode_to_string(&stamped, &ty).unwrap();
    assert_eq!(text, r#"{"at":"at 2024-05-01T12:30:00+02:00"}"#);

    assert_eq!(decoder.decode_str(&text, &ty).unwrap(), stamped);
    let lazy = decoder
        .decode_stream(Rc::new(MemoryStream::from(text.as_str())), &ty)
        .unwrap();
    assert_eq!(lazy, stamped);
}

#[test]
fn test_template_bound_to_date_time() {
    let (dir, _guard) = temp_path("formatter_generic_date_time");
    let (encoder, decoder) = date_time_codecs(&dir);
    let ty = parse_type("Box<DateTime>").unwrap();
    let boxed = Value::Object(Object::new("Box", [("content", created())]));

    let text = encoder.encode_to_string(&boxed, &ty).unwrap();
    assert_eq!(text, r#"{"content":"2024-05-01T12:30:00+02:00"}"#);
    assert_eq!(decoder.decode_str(&text, &ty).unwrap(), boxed);
}
