//! Purpose: Re-emit a populated object as a decoded-JSON value tree.
//! Exports: `emit`.
//! Role: Inverse of `populate`; together they form the encode/decode halves
//! of the archiving contract without committing to a wire format.
//! Invariants: Output mapping keys follow descriptor order under each field's
//! resolved JSON key, so re-emission is deterministic.
//! Invariants: A field value whose shape contradicts its declared kind is an
//! `Invariant` error, never silently skipped.

use serde_json::{Map, Value};

use crate::core::coerce::expected_kind;
use crate::core::error::{Error, ErrorKind};
use crate::core::object::{FieldValue, MappedObject};
use crate::core::registry::Registry;
use crate::core::schema::FieldKind;

/// Walks the object's type descriptors and emits a mapping. Every declared
/// field is emitted, including ones still at their zero value.
pub fn emit(registry: &Registry, object: &MappedObject) -> Result<Value, Error> {
    let ty = registry.get(object.type_name()).ok_or_else(|| {
        Error::new(ErrorKind::NotFound)
            .with_message("type is not registered")
            .with_type(object.type_name())
    })?;

    let mut out = Map::new();
    for bound in &ty.fields {
        let Some(value) = object.get(&bound.descriptor.name) else {
            return Err(Error::new(ErrorKind::Invariant)
                .with_message("declared field is missing from the object")
                .with_type(ty.name.clone())
                .with_field(bound.descriptor.name.clone()));
        };
        let emitted = emit_value(registry, &bound.descriptor.kind, value).map_err(|err| {
            if err.field().is_none() {
                err.with_field(bound.descriptor.name.clone())
                    .with_type(ty.name.clone())
            } else {
                err
            }
        })?;
        out.insert(bound.key.clone(), emitted);
    }
    Ok(Value::Object(out))
}

fn emit_value(registry: &Registry, kind: &FieldKind, value: &FieldValue) -> Result<Value, Error> {
    match (kind, value) {
        (FieldKind::Bool, FieldValue::Bool(flag)) => Ok(Value::Bool(*flag)),
        (FieldKind::Int, FieldValue::Int(int)) => Ok(Value::from(*int)),
        (FieldKind::Float, FieldValue::Float(float)) => serde_json::Number::from_f64(*float)
            .map(Value::Number)
            .ok_or_else(|| {
                Error::new(ErrorKind::Invariant).with_message("float field holds a non-finite value")
            }),
        (FieldKind::Str, FieldValue::Str(text)) => Ok(Value::String(text.clone())),
        (FieldKind::Object { .. }, FieldValue::Null) => Ok(Value::Null),
        (FieldKind::Object { type_name, .. }, FieldValue::Object(nested)) => {
            if nested.type_name() != type_name.as_str() {
                return Err(Error::new(ErrorKind::Invariant)
                    .with_message(format!(
                        "nested object is a `{}`, declared as `{type_name}`",
                        nested.type_name()
                    )));
            }
            emit(registry, nested)
        }
        (FieldKind::Sequence(element), FieldValue::Sequence(items)) => items
            .iter()
            .map(|item| emit_value(registry, element, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (kind, value) => Err(Error::new(ErrorKind::Invariant)
            .with_message("field value is outside its declared kind")
            .with_expected(expected_kind(kind))
            .with_actual(value.kind())),
    }
}
