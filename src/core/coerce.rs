//! Purpose: Scalar coercion table and per-kind zero values.
//! Exports: `coerce_scalar`, `zero_value`, `expected_kind`.
//! Role: Pure decision layer under `populate`; no policy, no recursion.
//! Invariants: Coercion runs string-literal -> number only, never the other
//! way (a number offered to a string field is a mismatch).
//! Invariants: Bool accepts bool or the exact 0/1 integer encoding, nothing else.

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::object::FieldValue;
use crate::core::schema::FieldKind;
use crate::core::value::Kind;

/// Value-tree shape a field kind expects, for error reporting.
pub fn expected_kind(kind: &FieldKind) -> Kind {
    match kind {
        FieldKind::Bool => Kind::Bool,
        FieldKind::Int | FieldKind::Float => Kind::Number,
        FieldKind::Str => Kind::String,
        FieldKind::Object { .. } => Kind::Mapping,
        FieldKind::Sequence(_) => Kind::Sequence,
    }
}

/// Default a field takes when its key is absent (or explicitly null).
pub fn zero_value(kind: &FieldKind) -> FieldValue {
    match kind {
        FieldKind::Bool => FieldValue::Bool(false),
        FieldKind::Int => FieldValue::Int(0),
        FieldKind::Float => FieldValue::Float(0.0),
        FieldKind::Str => FieldValue::Str(String::new()),
        FieldKind::Object { .. } => FieldValue::Null,
        FieldKind::Sequence(_) => FieldValue::Sequence(Vec::new()),
    }
}

/// Coerces one scalar value to the field's native scalar type.
///
/// Callers attach field and type context to the returned error; this layer
/// only knows kinds.
pub fn coerce_scalar(kind: &FieldKind, value: &Value) -> Result<FieldValue, Error> {
    match kind {
        FieldKind::Bool => coerce_bool(value),
        FieldKind::Int => coerce_int(value),
        FieldKind::Float => coerce_float(value),
        FieldKind::Str => match value {
            Value::String(text) => Ok(FieldValue::Str(text.clone())),
            other => Err(mismatch(kind, other)),
        },
        FieldKind::Object { .. } | FieldKind::Sequence(_) => Err(Error::new(ErrorKind::Usage)
            .with_message("coerce_scalar called with a non-scalar kind")),
    }
}

fn coerce_bool(value: &Value) -> Result<FieldValue, Error> {
    match value {
        Value::Bool(flag) => Ok(FieldValue::Bool(*flag)),
        Value::Number(num) => match num.as_i64() {
            Some(0) => Ok(FieldValue::Bool(false)),
            Some(1) => Ok(FieldValue::Bool(true)),
            _ => Err(mismatch(&FieldKind::Bool, value)
                .with_message("bool accepts only the 0/1 numeric encoding")),
        },
        other => Err(mismatch(&FieldKind::Bool, other)),
    }
}

fn coerce_int(value: &Value) -> Result<FieldValue, Error> {
    match value {
        Value::Number(num) => {
            if let Some(int) = num.as_i64() {
                return Ok(FieldValue::Int(int));
            }
            // Integral floats are exact within i64's mantissa-safe range.
            if let Some(float) = num.as_f64() {
                if float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64 {
                    return Ok(FieldValue::Int(float as i64));
                }
            }
            Err(mismatch(&FieldKind::Int, value).with_message("number is not an integer"))
        }
        Value::String(text) => text.parse::<i64>().map(FieldValue::Int).map_err(|_| {
            mismatch(&FieldKind::Int, value).with_message("string literal is not an integer")
        }),
        other => Err(mismatch(&FieldKind::Int, other)),
    }
}

fn coerce_float(value: &Value) -> Result<FieldValue, Error> {
    match value {
        Value::Number(num) => num
            .as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| mismatch(&FieldKind::Float, value)),
        Value::String(text) => text.parse::<f64>().map(FieldValue::Float).map_err(|_| {
            mismatch(&FieldKind::Float, value).with_message("string literal is not numeric")
        }),
        other => Err(mismatch(&FieldKind::Float, other)),
    }
}

fn mismatch(kind: &FieldKind, value: &Value) -> Error {
    Error::new(ErrorKind::Coercion)
        .with_message("scalar kind mismatch")
        .with_expected(expected_kind(kind))
        .with_actual(Kind::of(value))
}

#[cfg(test)]
mod tests {
    use super::{coerce_scalar, zero_value};
    use crate::core::error::ErrorKind;
    use crate::core::object::FieldValue;
    use crate::core::schema::FieldKind;
    use serde_json::json;

    #[test]
    fn numeric_string_coerces_into_numeric_fields() {
        assert_eq!(
            coerce_scalar(&FieldKind::Int, &json!("42")).unwrap(),
            FieldValue::Int(42)
        );
        assert_eq!(
            coerce_scalar(&FieldKind::Float, &json!("2.5")).unwrap(),
            FieldValue::Float(2.5)
        );
    }

    #[test]
    fn number_does_not_coerce_into_a_string_field() {
        let err = coerce_scalar(&FieldKind::Str, &json!(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Coercion);
    }

    #[test]
    fn integral_float_fills_an_int_field() {
        assert_eq!(
            coerce_scalar(&FieldKind::Int, &json!(3.0)).unwrap(),
            FieldValue::Int(3)
        );
        assert!(coerce_scalar(&FieldKind::Int, &json!(3.5)).is_err());
    }

    #[test]
    fn bool_accepts_only_bool_or_zero_one() {
        assert_eq!(
            coerce_scalar(&FieldKind::Bool, &json!(1)).unwrap(),
            FieldValue::Bool(true)
        );
        assert_eq!(
            coerce_scalar(&FieldKind::Bool, &json!(0)).unwrap(),
            FieldValue::Bool(false)
        );
        assert!(coerce_scalar(&FieldKind::Bool, &json!(2)).is_err());
        assert!(coerce_scalar(&FieldKind::Bool, &json!("true")).is_err());
    }

    #[test]
    fn non_numeric_string_fails_integer_coercion() {
        let err = coerce_scalar(&FieldKind::Int, &json!("forty-two")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Coercion);
    }

    #[test]
    fn zero_values_match_their_kind() {
        assert_eq!(zero_value(&FieldKind::Bool), FieldValue::Bool(false));
        assert_eq!(zero_value(&FieldKind::Int), FieldValue::Int(0));
        assert_eq!(zero_value(&FieldKind::Float), FieldValue::Float(0.0));
        assert_eq!(zero_value(&FieldKind::Str), FieldValue::Str(String::new()));
        assert_eq!(zero_value(&FieldKind::object("Person")), FieldValue::Null);
        assert_eq!(
            zero_value(&FieldKind::sequence(FieldKind::Int)),
            FieldValue::Sequence(Vec::new())
        );
    }
}
