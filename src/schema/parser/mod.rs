// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type signature parser using Pest.
//!
//! Parses the canonical string form produced by
//! [`TypeDescriptor`]'s `Display` impl back into a descriptor.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::core::{CodecError, Result};
use crate::schema::descriptor::{ScalarKind, TypeDescriptor};

/// Pest parser for type signatures.
#[derive(Parser)]
#[grammar = "schema/parser/type_signature.pest"] // Path relative to src/ directory
pub struct TypeSignatureParser;

/// Parse a type signature such as `list<Dummy|null>`.
pub fn parse_type(signature: &str) -> Result<TypeDescriptor> {
    let mut pairs = TypeSignatureParser::parse(Rule::signature, signature)
        .map_err(|e| CodecError::parse("type signature", format!("{e}")))?;

    let root = pairs
        .next()
        .ok_or_else(|| CodecError::parse("type signature", "empty signature"))?;

    let union = root
        .into_inner()
        .find(|p| p.as_rule() == Rule::union)
        .ok_or_else(|| CodecError::parse("type signature", format!("no type in \"{signature}\"")))?;

    build_union(union)
}

fn build_union(pair: Pair<Rule>) -> Result<TypeDescriptor> {
    let members = pair
        .into_inner()
        .map(build_member)
        .collect::<Result<Vec<_>>>()?;
    Ok(TypeDescriptor::union(members))
}

fn build_member(pair: Pair<Rule>) -> Result<TypeDescriptor> {
    match pair.as_rule() {
        Rule::nullable => {
            let named = first_inner(pair)?;
            Ok(TypeDescriptor::nullable(build_named(named)?))
        }
        Rule::list_type => Ok(TypeDescriptor::list(build_union(first_inner(pair)?)?)),
        Rule::dict_type => Ok(TypeDescriptor::dict(build_union(first_inner(pair)?)?)),
        Rule::enum_type => {
            let mut inner = pair.into_inner();
            let (Some(path), Some(backing)) = (inner.next(), inner.next()) else {
                return Err(CodecError::parse("type signature", "incomplete enum type"));
            };
            let kind = ScalarKind::from_name(backing.as_str()).ok_or_else(|| {
                CodecError::parse(
                    "type signature",
                    format!("invalid enum backing type \"{}\"", backing.as_str()),
                )
            })?;
            Ok(TypeDescriptor::backed_enum(path.as_str(), kind))
        }
        Rule::named => build_named(pair),
        rule => Err(CodecError::parse(
            "type signature",
            format!("unexpected rule {rule:?}"),
        )),
    }
}

fn build_named(pair: Pair<Rule>) -> Result<TypeDescriptor> {
    let mut inner = pair.into_inner();
    let path = inner
        .next()
        .ok_or_else(|| CodecError::parse("type signature", "missing type name"))?
        .as_str();

    let generics = match inner.next() {
        Some(generics) => generics
            .into_inner()
            .map(build_union)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    if generics.is_empty() {
        if let Some(kind) = ScalarKind::from_name(path) {
            return Ok(TypeDescriptor::Scalar(kind));
        }
    }

    Ok(TypeDescriptor::generic(path, generics))
}

fn first_inner(pair: Pair<Rule>) -> Result<Pair<Rule>> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| CodecError::parse("type signature", format!("empty {rule:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_type("int").unwrap(), TypeDescriptor::int());
        assert_eq!(parse_type("mixed").unwrap(), TypeDescriptor::mixed());
        assert_eq!(
            parse_type("string|null").unwrap(),
            TypeDescriptor::nullable(TypeDescriptor::string())
        );
    }

    #[test]
    fn test_parse_collections() {
        assert_eq!(
            parse_type("list<Dummy>").unwrap(),
            TypeDescriptor::list(TypeDescriptor::object("Dummy"))
        );
        assert_eq!(
            parse_type("dict< list<int> >").unwrap(),
            TypeDescriptor::dict(TypeDescriptor::list(TypeDescriptor::int()))
        );
    }

    #[test]
    fn test_parse_enum_and_generics() {
        assert_eq!(
            parse_type("enum<App::Suit, string>").unwrap(),
            TypeDescriptor::backed_enum("App::Suit", ScalarKind::String)
        );
        assert_eq!(
            parse_type("Pair<int, list<string>>").unwrap(),
            TypeDescriptor::generic(
                "Pair",
                vec![
                    TypeDescriptor::int(),
                    TypeDescriptor::list(TypeDescriptor::string())
                ]
            )
        );
    }

    #[test]
    fn test_parse_nullable_shorthand() {
        assert_eq!(
            parse_type("?DateTime").unwrap(),
            TypeDescriptor::nullable(TypeDescriptor::date_time())
        );
    }

    #[test]
    fn test_canonical_round_trip() {
        for signature in [
            "int",
            "Dummy|null",
            "list<dict<Dummy|int>>",
            "enum<Suit, int>",
            "Box<Pair<int, string>>|list<string>",
        ] {
            let ty = parse_type(signature).unwrap();
            assert_eq!(ty.to_string(), signature);
        }
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_type("list<").is_err());
        assert!(parse_type("").is_err());
        assert!(parse_type("int||string").is_err());
    }
}
