//! Purpose: Build-once, read-many registry of validated type descriptors.
//! Exports: `Registry`, `RegisteredType`, `BoundField`.
//! Role: The single place where mapping configuration is checked; populate
//! and emit trust what they read from here.
//! Invariants: A failed registration leaves the registry exactly as it was.
//! Invariants: After registration, resolved JSON keys are unique per type and
//! no cycle exists through required object edges.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::{Error, ErrorKind};
use crate::core::schema::{FieldDescriptor, FieldKind, TypeDescriptor};

/// A field descriptor together with its resolved JSON key.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundField {
    pub descriptor: FieldDescriptor,
    pub key: String,
}

/// A validated type, ready for populate/emit.
#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredType {
    pub name: String,
    pub fields: Vec<BoundField>,
    pub id_field: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: BTreeMap<String, RegisteredType>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Validates and registers one type. Nested type names may be registered
    /// later; a cycle of required object edges is rejected at whichever
    /// registration closes it.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), Error> {
        if descriptor.name.is_empty() {
            return Err(Error::new(ErrorKind::Usage).with_message("type name is empty"));
        }
        if self.types.contains_key(&descriptor.name) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("type already registered")
                .with_type(descriptor.name));
        }

        let registered = self.bind(descriptor)?;
        self.check_cycles(&registered)?;

        tracing::debug!(
            type_name = %registered.name,
            fields = registered.fields.len(),
            "registered type"
        );
        self.types.insert(registered.name.clone(), registered);
        Ok(())
    }

    /// Resolves each field to its JSON key and validates the key mapping.
    fn bind(&self, descriptor: TypeDescriptor) -> Result<RegisteredType, Error> {
        let mut field_names = BTreeSet::new();
        for field in &descriptor.fields {
            if field.name.is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("field name is empty")
                    .with_type(descriptor.name.clone()));
            }
            if !field_names.insert(field.name.as_str()) {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("field declared twice")
                    .with_type(descriptor.name.clone())
                    .with_field(field.name.clone()));
            }
        }

        let mut keys_seen = BTreeSet::new();
        let mut targets_seen = BTreeSet::new();
        for entry in &descriptor.key_mapping {
            if !field_names.contains(entry.field.as_str()) {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("key mapping names an undeclared field")
                    .with_type(descriptor.name.clone())
                    .with_field(entry.field.clone()));
            }
            if !keys_seen.insert(entry.json_key.as_str()) {
                return Err(Error::new(ErrorKind::DuplicateMapping)
                    .with_message(format!("JSON key `{}` mapped twice", entry.json_key))
                    .with_type(descriptor.name.clone()));
            }
            if !targets_seen.insert(entry.field.as_str()) {
                return Err(Error::new(ErrorKind::DuplicateMapping)
                    .with_message("two JSON keys map to one field")
                    .with_type(descriptor.name.clone())
                    .with_field(entry.field.clone()));
            }
        }

        if let Some(id_field) = &descriptor.id_field {
            let declared = descriptor.fields.iter().find(|f| &f.name == id_field);
            match declared {
                Some(field) if field.kind == FieldKind::Str => {}
                Some(_) => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message("id field must be a string field")
                        .with_type(descriptor.name.clone())
                        .with_field(id_field.clone()));
                }
                None => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message("id field is not declared on the type")
                        .with_type(descriptor.name.clone())
                        .with_field(id_field.clone()));
                }
            }
        }

        let mut resolved = BTreeSet::new();
        let mut fields = Vec::with_capacity(descriptor.fields.len());
        for field in descriptor.fields {
            let key = descriptor
                .key_mapping
                .iter()
                .find(|entry| entry.field == field.name)
                .map(|entry| entry.json_key.clone())
                .unwrap_or_else(|| field.name.clone());
            if !resolved.insert(key.clone()) {
                return Err(Error::new(ErrorKind::DuplicateMapping)
                    .with_message(format!("two fields resolve to JSON key `{key}`"))
                    .with_type(descriptor.name.clone())
                    .with_field(field.name));
            }
            fields.push(BoundField {
                descriptor: field,
                key,
            });
        }

        Ok(RegisteredType {
            name: descriptor.name,
            fields,
            id_field: descriptor.id_field,
        })
    }

    /// Walks required object edges from the candidate; reaching the candidate
    /// again means a cycle would have no finite value. Optional objects and
    /// sequences terminate, so they never count; unknown type names are
    /// leaves until they register.
    fn check_cycles(&self, candidate: &RegisteredType) -> Result<(), Error> {
        let mut stack: Vec<&str> = required_edges(&candidate.fields);
        let mut seen = BTreeSet::new();
        while let Some(name) = stack.pop() {
            if name == candidate.name {
                return Err(Error::new(ErrorKind::CyclicType)
                    .with_message("required object fields nest the type into itself")
                    .with_type(candidate.name.clone()));
            }
            if !seen.insert(name) {
                continue;
            }
            if let Some(registered) = self.types.get(name) {
                stack.extend(required_edges(&registered.fields));
            }
        }
        Ok(())
    }
}

fn required_edges(fields: &[BoundField]) -> Vec<&str> {
    fields
        .iter()
        .filter_map(|field| match &field.descriptor.kind {
            FieldKind::Object {
                type_name,
                required: true,
            } => Some(type_name.as_str()),
            _ => None,
        })
        .collect()
}
