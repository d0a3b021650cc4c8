//! Purpose: Populate a registered type from a decoded JSON mapping.
//! Exports: `Mapper`, `MapperOptions`, `ErrorMode`, `CoercionPolicy`, `Populated`.
//! Role: Recursive driver over the pure coercion layer; owns the strict vs
//! lenient policy and the coercion-failure policy.
//! Invariants: Fields populate independently; a failure in one field never
//! aborts its siblings in lenient mode.
//! Invariants: Shape failures on a nested or sequence branch fail that whole
//! branch; no partial object escapes from it.
//! Invariants: Unknown input keys are ignored, never stored.

use serde_json::{Map, Value};

use crate::core::coerce;
use crate::core::error::{Error, ErrorKind};
use crate::core::object::{FieldValue, MappedObject};
use crate::core::registry::{BoundField, RegisteredType, Registry};
use crate::core::schema::FieldKind;
use crate::core::value::Kind;

/// Conventional primary-key names tried for the catch-all identifier field,
/// in order.
const ID_KEYS: [&str; 3] = ["id", "_id", "objectId"];

/// Error-aggregation policy for populate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ErrorMode {
    /// Abort on the first field error.
    Strict,
    /// Collect all field errors and return a best-effort object.
    #[default]
    Lenient,
}

/// What to do when a scalar refuses to coerce.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CoercionPolicy {
    /// Substitute the kind's zero value and continue. Partial data is common
    /// in JSON feeds, so this is the default.
    #[default]
    Substitute,
    /// Treat the failure as a field error, subject to [`ErrorMode`].
    Fail,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MapperOptions {
    pub mode: ErrorMode,
    pub coercion: CoercionPolicy,
}

/// Outcome of one populate call. `errors` is always empty in strict mode;
/// in lenient mode it lists every field error that was absorbed while
/// building the best-effort object.
#[derive(Debug)]
pub struct Populated {
    pub object: MappedObject,
    pub errors: Vec<Error>,
}

/// Converts between value trees and typed object graphs using a registry
/// built beforehand. Stateless across calls; share one behind a reference
/// from as many threads as you like.
#[derive(Clone, Copy, Debug)]
pub struct Mapper<'a> {
    registry: &'a Registry,
    options: MapperOptions,
}

impl<'a> Mapper<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            options: MapperOptions::default(),
        }
    }

    pub fn with_options(registry: &'a Registry, options: MapperOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn options(&self) -> MapperOptions {
        self.options
    }

    /// Builds a `MappedObject` of `type_name` from a top-level mapping.
    pub fn populate(&self, type_name: &str, input: &Value) -> Result<Populated, Error> {
        let ty = self.registry.get(type_name).ok_or_else(|| {
            Error::new(ErrorKind::NotFound)
                .with_message("type is not registered")
                .with_type(type_name)
        })?;
        let Value::Object(map) = input else {
            return Err(Error::new(ErrorKind::Shape)
                .with_message("top-level value is not a mapping")
                .with_type(type_name)
                .with_expected(Kind::Mapping)
                .with_actual(Kind::of(input)));
        };

        let mut errors = Vec::new();
        let mut fields = Vec::with_capacity(ty.fields.len());
        for bound in &ty.fields {
            match self.populate_field(ty, bound, map) {
                Ok((value, nested)) => {
                    errors.extend(nested);
                    fields.push((bound.descriptor.name.clone(), value));
                }
                Err(err) => match self.options.mode {
                    ErrorMode::Strict => return Err(err),
                    ErrorMode::Lenient => {
                        tracing::debug!(
                            type_name = %ty.name,
                            field = %bound.descriptor.name,
                            error = %err,
                            "collected field error"
                        );
                        errors.push(err);
                        fields.push((
                            bound.descriptor.name.clone(),
                            coerce::zero_value(&bound.descriptor.kind),
                        ));
                    }
                },
            }
        }

        let mut object = MappedObject::new(ty.name.clone(), fields);
        self.capture_identifier(ty, map, &mut object);
        log_unknown_keys(ty, map);
        Ok(Populated { object, errors })
    }

    /// Inverse of [`Mapper::populate`]; delegates to [`crate::core::emit::emit`].
    pub fn emit(&self, object: &MappedObject) -> Result<Value, Error> {
        crate::core::emit::emit(self.registry, object)
    }

    fn populate_field(
        &self,
        ty: &RegisteredType,
        bound: &BoundField,
        map: &Map<String, Value>,
    ) -> Result<(FieldValue, Vec<Error>), Error> {
        // Explicit null is treated like an absent key everywhere except a
        // required object field, which has no default to fall back to.
        let value = map.get(&bound.key).filter(|value| !value.is_null());
        self.populate_value(&bound.descriptor.kind, value)
            .map(|(value, nested)| {
                let nested = nested
                    .into_iter()
                    .map(|err| contextualize(err, &ty.name, &bound.descriptor.name))
                    .collect();
                (value, nested)
            })
            .map_err(|err| contextualize(err, &ty.name, &bound.descriptor.name))
    }

    fn populate_value(
        &self,
        kind: &FieldKind,
        value: Option<&Value>,
    ) -> Result<(FieldValue, Vec<Error>), Error> {
        match kind {
            FieldKind::Bool | FieldKind::Int | FieldKind::Float | FieldKind::Str => {
                let Some(value) = value else {
                    return Ok((coerce::zero_value(kind), Vec::new()));
                };
                match coerce::coerce_scalar(kind, value) {
                    Ok(coerced) => Ok((coerced, Vec::new())),
                    Err(err) => match self.options.coercion {
                        CoercionPolicy::Fail => Err(err),
                        CoercionPolicy::Substitute => {
                            tracing::debug!(error = %err, "substituted zero value");
                            Ok((coerce::zero_value(kind), Vec::new()))
                        }
                    },
                }
            }
            FieldKind::Object {
                type_name,
                required,
            } => match value {
                None if *required => Err(Error::new(ErrorKind::Shape)
                    .with_message("required object field is absent")
                    .with_expected(Kind::Mapping)
                    .with_actual(Kind::Null)),
                None => Ok((FieldValue::Null, Vec::new())),
                Some(nested @ Value::Object(_)) => {
                    let populated = self.populate(type_name, nested)?;
                    Ok((
                        FieldValue::Object(Box::new(populated.object)),
                        populated.errors,
                    ))
                }
                Some(other) => Err(Error::new(ErrorKind::Shape)
                    .with_message("nested object field is not a mapping")
                    .with_expected(Kind::Mapping)
                    .with_actual(Kind::of(other))),
            },
            FieldKind::Sequence(element) => match value {
                None => Ok((FieldValue::Sequence(Vec::new()), Vec::new())),
                Some(Value::Array(items)) => {
                    let mut out = Vec::with_capacity(items.len());
                    let mut collected = Vec::new();
                    for item in items {
                        let slot = if item.is_null() { None } else { Some(item) };
                        match self.populate_value(element, slot) {
                            Ok((value, nested)) => {
                                collected.extend(nested);
                                out.push(value);
                            }
                            Err(err) => match self.options.mode {
                                ErrorMode::Strict => return Err(err),
                                // Lenient: drop the element, keep the rest.
                                ErrorMode::Lenient => collected.push(err),
                            },
                        }
                    }
                    Ok((FieldValue::Sequence(out), collected))
                }
                Some(other) => Err(Error::new(ErrorKind::Shape)
                    .with_message("sequence field is not a sequence")
                    .with_expected(Kind::Sequence)
                    .with_actual(Kind::of(other))),
            },
        }
    }

    /// Catch-all fallback: when the designated identifier field was not
    /// fed by its own key, capture whatever conventional primary key the
    /// input carries, normalized to its string literal.
    fn capture_identifier(
        &self,
        ty: &RegisteredType,
        map: &Map<String, Value>,
        object: &mut MappedObject,
    ) {
        let Some(id_field) = &ty.id_field else {
            return;
        };
        let Some(bound) = ty.fields.iter().find(|b| &b.descriptor.name == id_field) else {
            return;
        };
        if map.get(&bound.key).is_some_and(|value| !value.is_null()) {
            return;
        }
        for key in ID_KEYS {
            let literal = match map.get(key) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Number(num)) => num.to_string(),
                _ => continue,
            };
            tracing::debug!(type_name = %ty.name, key, "captured identifier");
            object.set(id_field, FieldValue::Str(literal));
            return;
        }
    }
}

fn contextualize(err: Error, type_name: &str, field: &str) -> Error {
    // Keep the deepest context; only fill in what is missing.
    let err = if err.field().is_none() {
        err.with_field(field)
    } else {
        err
    };
    if err.type_name().is_none() {
        err.with_type(type_name)
    } else {
        err
    }
}

fn log_unknown_keys(ty: &RegisteredType, map: &Map<String, Value>) {
    for key in map.keys() {
        let declared = ty.fields.iter().any(|bound| &bound.key == key);
        let conventional = ty.id_field.is_some() && ID_KEYS.contains(&key.as_str());
        if !declared && !conventional {
            tracing::debug!(type_name = %ty.name, key = %key, "ignoring unknown key");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoercionPolicy, ErrorMode, Mapper, MapperOptions};
    use crate::core::error::ErrorKind;
    use crate::core::object::FieldValue;
    use crate::core::registry::Registry;
    use crate::core::schema::{FieldKind, TypeDescriptor};
    use crate::core::value::Kind;
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(
                TypeDescriptor::new("Person")
                    .field("id", FieldKind::Int)
                    .field("name", FieldKind::Str)
                    .field("friend", FieldKind::object("Person")),
            )
            .unwrap();
        registry
    }

    fn strict() -> MapperOptions {
        MapperOptions {
            mode: ErrorMode::Strict,
            coercion: CoercionPolicy::Fail,
        }
    }

    #[test]
    fn absent_keys_take_zero_values() {
        let registry = registry();
        let populated = Mapper::new(&registry)
            .populate("Person", &json!({}))
            .unwrap();
        assert!(populated.errors.is_empty());
        assert_eq!(populated.object.get("id"), Some(&FieldValue::Int(0)));
        assert_eq!(
            populated.object.get("name"),
            Some(&FieldValue::Str(String::new()))
        );
        assert_eq!(populated.object.get("friend"), Some(&FieldValue::Null));
    }

    #[test]
    fn explicit_null_scalar_counts_as_absent() {
        let registry = registry();
        let populated = Mapper::new(&registry)
            .populate("Person", &json!({"id": null, "name": null}))
            .unwrap();
        assert!(populated.errors.is_empty());
        assert_eq!(populated.object.get("id"), Some(&FieldValue::Int(0)));
    }

    #[test]
    fn top_level_must_be_a_mapping() {
        let registry = registry();
        let err = Mapper::new(&registry)
            .populate("Person", &json!([1, 2]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert_eq!(err.actual(), Some(Kind::Sequence));
    }

    #[test]
    fn unregistered_type_is_not_found() {
        let registry = registry();
        let err = Mapper::new(&registry)
            .populate("Robot", &json!({}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn strict_mode_surfaces_the_first_coercion_error() {
        let registry = registry();
        let err = Mapper::with_options(&registry, strict())
            .populate("Person", &json!({"id": 1, "name": 42}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Coercion);
        assert_eq!(err.field(), Some("name"));
        assert_eq!(err.expected(), Some(Kind::String));
        assert_eq!(err.actual(), Some(Kind::Number));
    }

    #[test]
    fn lenient_mode_collects_errors_and_defaults_the_field() {
        let registry = registry();
        let options = MapperOptions {
            mode: ErrorMode::Lenient,
            coercion: CoercionPolicy::Fail,
        };
        let populated = Mapper::with_options(&registry, options)
            .populate("Person", &json!({"id": 1, "name": 42}))
            .unwrap();
        assert_eq!(populated.errors.len(), 1);
        assert_eq!(populated.errors[0].field(), Some("name"));
        assert_eq!(populated.object.get("id"), Some(&FieldValue::Int(1)));
        assert_eq!(
            populated.object.get("name"),
            Some(&FieldValue::Str(String::new()))
        );
    }

    #[test]
    fn substitute_policy_absorbs_coercion_failures_silently() {
        let registry = registry();
        let populated = Mapper::new(&registry)
            .populate("Person", &json!({"id": "not-a-number", "name": "Ada"}))
            .unwrap();
        assert!(populated.errors.is_empty());
        assert_eq!(populated.object.get("id"), Some(&FieldValue::Int(0)));
    }

    #[test]
    fn nested_shape_mismatch_fails_the_branch_not_the_siblings() {
        let registry = registry();
        let populated = Mapper::new(&registry)
            .populate("Person", &json!({"id": 1, "name": "Ada", "friend": [1, 2]}))
            .unwrap();
        assert_eq!(populated.errors.len(), 1);
        assert_eq!(populated.errors[0].kind(), ErrorKind::Shape);
        assert_eq!(populated.errors[0].field(), Some("friend"));
        assert_eq!(populated.object.get("friend"), Some(&FieldValue::Null));
        assert_eq!(populated.object.get("id"), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn required_object_absence_is_a_shape_error() {
        let mut registry = Registry::new();
        registry
            .register(TypeDescriptor::new("Handle").field("name", FieldKind::Str))
            .unwrap();
        registry
            .register(
                TypeDescriptor::new("Account")
                    .field("owner", FieldKind::required_object("Handle")),
            )
            .unwrap();
        let err = Mapper::with_options(&registry, strict())
            .populate("Account", &json!({}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert_eq!(err.field(), Some("owner"));
    }

    #[test]
    fn lenient_sequence_skips_bad_elements() {
        let mut registry = Registry::new();
        registry
            .register(
                TypeDescriptor::new("Series")
                    .field("points", FieldKind::sequence(FieldKind::Int)),
            )
            .unwrap();
        let options = MapperOptions {
            mode: ErrorMode::Lenient,
            coercion: CoercionPolicy::Fail,
        };
        let populated = Mapper::with_options(&registry, options)
            .populate("Series", &json!({"points": [1, "two", 3]}))
            .unwrap();
        assert_eq!(populated.errors.len(), 1);
        assert_eq!(populated.errors[0].field(), Some("points"));
        assert_eq!(
            populated.object.get("points"),
            Some(&FieldValue::Sequence(vec![
                FieldValue::Int(1),
                FieldValue::Int(3)
            ]))
        );
    }

    #[test]
    fn unknown_keys_are_ignored_not_stored() {
        let registry = registry();
        let populated = Mapper::new(&registry)
            .populate("Person", &json!({"id": 1, "shoe_size": 43}))
            .unwrap();
        assert!(populated.object.get("shoe_size").is_none());
        assert_eq!(populated.object.len(), 3);
    }

    #[test]
    fn catch_all_identifier_captures_conventional_keys() {
        let mut registry = Registry::new();
        registry
            .register(
                TypeDescriptor::new("Record")
                    .field("object_id", FieldKind::Str)
                    .field("label", FieldKind::Str)
                    .id_field("object_id"),
            )
            .unwrap();
        let mapper = Mapper::new(&registry);

        let populated = mapper
            .populate("Record", &json!({"_id": 12345, "label": "x"}))
            .unwrap();
        assert_eq!(
            populated.object.get("object_id"),
            Some(&FieldValue::Str("12345".to_string()))
        );

        // The field's own key wins over the convention.
        let populated = mapper
            .populate("Record", &json!({"object_id": "own", "id": "conventional"}))
            .unwrap();
        assert_eq!(
            populated.object.get("object_id"),
            Some(&FieldValue::Str("own".to_string()))
        );
    }
}
