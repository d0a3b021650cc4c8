//! Purpose: Classify decoded JSON values for shape checks and error reporting.
//! Exports: `Kind`.
//! Role: Thin boundary over `serde_json::Value`, which is the value-tree type
//! the rest of the crate maps from and to.
//! Invariants: `serde_json` is built with `preserve_order`, so mapping keys
//! keep insertion order and re-emission is deterministic.

use std::fmt;

use serde_json::Value;

/// The six shapes a decoded JSON value can take.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl Kind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Sequence,
            Value::Object(_) => Kind::Mapping,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}
