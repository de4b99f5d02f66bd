//! Attribute literal classification.
//!
//! An attribute token is `<identifier><blanks><value>`. The value is a
//! double-quoted string, a `digits.digits` decimal or a run of digits;
//! alternatives are tried in that order so a decimal never matches as an
//! integer prefix.

use chumsky::prelude::*;
use gml_core::AttrValue;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attribute<'a> {
    pub(crate) key: &'a str,
    pub(crate) value: AttrValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LiteralError {
    /// The token does not match `identifier blanks value`.
    Malformed,
    /// The digits matched but do not fit the target numeric type.
    OutOfRange(String),
}

impl LiteralError {
    pub(crate) fn describe(&self, token: &str) -> String {
        match self {
            Self::Malformed => format!("malformed attribute: {token}"),
            Self::OutOfRange(digits) => format!("numeric value out of range: {digits}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawValue<'a> {
    Float(&'a str),
    Int(&'a str),
    Str(&'a str),
}

fn attribute_parser<'a>()
-> impl Parser<'a, &'a str, (&'a str, RawValue<'a>), extra::Err<Rich<'a, char>>> {
    let blanks = any()
        .filter(|c: &char| *c == ' ' || *c == '\t')
        .repeated()
        .at_least(1)
        .to(());

    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice();

    let digits = any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .to_slice();

    let decimal = digits
        .clone()
        .then(just('.'))
        .then(digits.clone())
        .to_slice();

    let quoted = just('"')
        .ignore_then(any().filter(|c: &char| *c != '"').repeated().to_slice())
        .then_ignore(just('"'));

    let value = choice((
        decimal.map(RawValue::Float),
        digits.map(RawValue::Int),
        quoted.map(RawValue::Str),
    ));

    ident.then_ignore(blanks).then(value).then_ignore(end())
}

/// Splits an attribute token into key and typed value.
pub(crate) fn classify_attribute(token: &str) -> Result<Attribute<'_>, LiteralError> {
    let (key, raw) = attribute_parser()
        .parse(token)
        .into_result()
        .map_err(|_| LiteralError::Malformed)?;

    let value = match raw {
        RawValue::Float(text) => text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(AttrValue::Float)
            .ok_or_else(|| LiteralError::OutOfRange(text.to_string()))?,
        RawValue::Int(text) => text
            .parse::<i64>()
            .map(AttrValue::Int)
            .map_err(|_| LiteralError::OutOfRange(text.to_string()))?,
        RawValue::Str(text) => AttrValue::Str(text.to_string()),
    };

    Ok(Attribute { key, value })
}
