//! Purpose: The populated result graph handed back to the host.
//! Exports: `MappedObject`, `FieldValue`.
//! Role: Owned, value-semantic output of `populate` and input of `emit`.
//! Invariants: A `MappedObject` exclusively owns its nested objects and
//! sequences; there is no sharing and no cycle in the value graph.
//! Invariants: Field order follows the type's descriptor order.

use crate::core::value::Kind;

/// Value stored in one field of a populated object.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(Box<MappedObject>),
    Sequence(Vec<FieldValue>),
}

impl FieldValue {
    /// Value-tree shape this field value would emit as.
    pub fn kind(&self) -> Kind {
        match self {
            FieldValue::Null => Kind::Null,
            FieldValue::Bool(_) => Kind::Bool,
            FieldValue::Int(_) | FieldValue::Float(_) => Kind::Number,
            FieldValue::Str(_) => Kind::String,
            FieldValue::Object(_) => Kind::Mapping,
            FieldValue::Sequence(_) => Kind::Sequence,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&MappedObject> {
        match self {
            FieldValue::Object(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

/// A populated instance of a registered type.
///
/// The mapping configuration behind it is fixed; the host may still mutate
/// field values through [`MappedObject::set`], which refuses to invent fields
/// the type never declared.
#[derive(Clone, Debug, PartialEq)]
pub struct MappedObject {
    type_name: String,
    fields: Vec<(String, FieldValue)>,
}

impl MappedObject {
    pub(crate) fn new(type_name: impl Into<String>, fields: Vec<(String, FieldValue)>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Replaces an existing field's value. Returns false (and stores nothing)
    /// for a field the type never declared.
    pub fn set(&mut self, field: &str, value: FieldValue) -> bool {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
