//! Purpose: Declarative per-type schema supplied by the host at registration time.
//! Exports: `FieldKind`, `FieldDescriptor`, `KeyMapEntry`, `TypeDescriptor`.
//! Role: Plain data describing how one target type binds to JSON keys; all
//! validation happens in `registry` so a descriptor under construction can be
//! freely shaped.
//! Invariants: Serde-derived so hosts can load schemas from config as easily
//! as building them in code.

use serde::{Deserialize, Serialize};

/// Expected kind of one mapped field.
///
/// An `Object` field is optional unless `required` is set; optional objects
/// default to null when the key is absent. Required object edges are the only
/// edges that count for cycle detection at registration, since an optional or
/// sequence edge always has a finite value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Str,
    Object {
        type_name: String,
        #[serde(default)]
        required: bool,
    },
    Sequence(Box<FieldKind>),
}

impl FieldKind {
    pub fn object(type_name: impl Into<String>) -> Self {
        FieldKind::Object {
            type_name: type_name.into(),
            required: false,
        }
    }

    pub fn required_object(type_name: impl Into<String>) -> Self {
        FieldKind::Object {
            type_name: type_name.into(),
            required: true,
        }
    }

    pub fn sequence(element: FieldKind) -> Self {
        FieldKind::Sequence(Box::new(element))
    }
}

/// One mapped attribute of a target type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

/// One `json_key -> field` override in a type's key mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyMapEntry {
    pub json_key: String,
    pub field: String,
}

/// Declarative description of one target type, handed to
/// `Registry::register` exactly once. Fields bind to the JSON key equal to
/// their name unless a `key_mapping` entry redirects them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_mapping: Vec<KeyMapEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            key_mapping: Vec::new(),
            id_field: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn map_key(mut self, json_key: impl Into<String>, field: impl Into<String>) -> Self {
        self.key_mapping.push(KeyMapEntry {
            json_key: json_key.into(),
            field: field.into(),
        });
        self
    }

    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }
}
