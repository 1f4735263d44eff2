//! Parsing of `default` literals into typed values.

use std::num::IntErrorKind;

use thiserror::Error;

use crate::metadata::{FieldKind, ScalarKind};


/// A coerced value, ready to be assigned to a field of the kind it was coerced for.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
}


#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("`{literal}` is not a valid base-10 integer")]
    InvalidInteger { literal: String },

    #[error("`{literal}` does not fit into a {bits}-bit integer")]
    IntegerOutOfRange { literal: String, bits: u32 },

    #[error("`{literal}` is not a valid floating point number")]
    InvalidFloat { literal: String },

    #[error("`{literal}` does not fit into a {bits}-bit float")]
    FloatOutOfRange { literal: String, bits: u32 },

    #[error("sequence literal `{literal}` must be wrapped in `{{` and `}}`")]
    MalformedSequence { literal: String },

    #[error("there is no coercion rule for kind {kind}")]
    UnsupportedType { kind: FieldKind },

    #[error("value {value:?} cannot be stored in a field of kind {kind}")]
    KindMismatch { kind: FieldKind, value: Value },
}


/// Parse `literal` into a [`Value`] matching `kind` (including its bit width).
///
/// - integers are base-10 with an optional sign,
/// - floats are base-10 with an optional exponent,
/// - strings are taken verbatim,
/// - sequences are written as `{a, b, c}`; every element is trimmed and then
///   parsed according to the element kind.
pub fn coerce(kind: FieldKind, literal: &str) -> Result<Value, CoercionError> {
    match kind {
        FieldKind::Scalar(scalar) => coerce_scalar(scalar, literal),
        FieldKind::Sequence(element) => coerce_sequence(element, literal),
        FieldKind::Record => Err(CoercionError::UnsupportedType { kind }),
    }
}

fn coerce_scalar(kind: ScalarKind, literal: &str) -> Result<Value, CoercionError> {
    match kind {
        ScalarKind::Integer { bits } => parse_integer(literal, bits).map(Value::Integer),
        ScalarKind::Float { bits } => parse_float(literal, bits).map(Value::Float),
        ScalarKind::String => Ok(Value::String(literal.to_string())),
        ScalarKind::Bool => Err(CoercionError::UnsupportedType {
            kind: FieldKind::Scalar(kind),
        }),
    }
}

fn coerce_sequence(element: ScalarKind, literal: &str) -> Result<Value, CoercionError> {
    if element == ScalarKind::Bool {
        return Err(CoercionError::UnsupportedType {
            kind: FieldKind::Sequence(element),
        });
    }

    let inner = literal
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| CoercionError::MalformedSequence {
            literal: literal.to_string(),
        })?;

    if inner.trim().is_empty() {
        return Ok(Value::Sequence(Vec::new()));
    }

    let elements = inner
        .split(',')
        .map(|element_literal| coerce_scalar(element, element_literal.trim()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Value::Sequence(elements))
}


fn effective_integer_bits(bits: u32) -> u32 {
    match bits {
        0 => isize::BITS,
        bits => bits.min(64),
    }
}

/// Parse a base-10 signed integer that must fit into `bits` bits.
pub fn parse_integer(literal: &str, bits: u32) -> Result<i64, CoercionError> {
    let bits = effective_integer_bits(bits);

    let integer = literal.parse::<i64>().map_err(|error| match error.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            CoercionError::IntegerOutOfRange {
                literal: literal.to_string(),
                bits,
            }
        }
        _ => CoercionError::InvalidInteger {
            literal: literal.to_string(),
        },
    })?;

    if bits < 64 {
        let max = (1i64 << (bits - 1)) - 1;
        let min = -(1i64 << (bits - 1));

        if integer < min || integer > max {
            return Err(CoercionError::IntegerOutOfRange {
                literal: literal.to_string(),
                bits,
            });
        }
    }

    Ok(integer)
}

/// Parse a base-10 float that must fit into a `bits`-bit float (`32` or `64`).
///
/// Explicit infinities (`inf`, `-infinity`) are accepted, but finite literals that
/// round to infinity at the requested width are rejected.
pub fn parse_float(literal: &str, bits: u32) -> Result<f64, CoercionError> {
    let bits = if bits == 32 { 32 } else { 64 };

    let invalid_float = |_| CoercionError::InvalidFloat {
        literal: literal.to_string(),
    };

    // 32-bit fields are rounded once, straight from the literal; widening the
    // result to `f64` is exact, so narrowing it again on assignment is lossless.
    let float = if bits == 32 {
        literal.parse::<f32>().map(f64::from).map_err(invalid_float)?
    } else {
        literal.parse::<f64>().map_err(invalid_float)?
    };

    if float.is_infinite() && !is_infinity_literal(literal) {
        return Err(CoercionError::FloatOutOfRange {
            literal: literal.to_string(),
            bits,
        });
    }

    Ok(float)
}

fn is_infinity_literal(literal: &str) -> bool {
    literal
        .trim_start_matches(['+', '-'])
        .to_ascii_lowercase()
        .starts_with("inf")
}
