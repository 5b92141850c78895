//! Recursive schema validation.
//!
//! The walk is driven by the schema's declarations, not by the entity's
//! keys. Unknown fields are detected by comparing the number of declared
//! fields found against the entity's distinct key count, after every
//! declared field has been checked. Consequently:
//! - a missing mandatory field is reported before unknown fields,
//! - the first *declared* field with a wrong type wins.

use crate::{FieldKind, Schema, SchemaNode, SchemaViolation};
use nestdoc_types::JsonKind;
use serde_json::{Map, Value};

/// Default name of the identifier field stamped on collection members.
pub const DEFAULT_ID_FIELD: &str = "_id";

/// Validates entities against a [`Schema`], failing on the first violation.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    id_field: String,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FIELD)
    }
}

impl SchemaValidator {
    /// Creates a validator that tolerates `id_field` on every entity even
    /// when the schema does not declare it.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }

    /// Returns the tolerated identifier field.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Validates a single entity or a list of entities.
    pub fn validate(&self, value: &Value, schema: &Schema) -> Result<(), SchemaViolation> {
        self.validate_at(value, schema, "")
    }

    /// Validates the leaves of a partial update.
    ///
    /// Each key is a dotted path below the entity. Every segment must be
    /// declared; leaves are type checked, and a leaf landing on a nested
    /// collection is validated as a whole. Missing fields are not reported.
    pub fn validate_partial<'a, I>(&self, leaves: I, schema: &Schema) -> Result<(), SchemaViolation>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        for (key, value) in leaves {
            self.validate_leaf(key, value, schema)?;
        }
        Ok(())
    }

    fn validate_at(
        &self,
        value: &Value,
        schema: &Schema,
        path: &str,
    ) -> Result<(), SchemaViolation> {
        match value {
            Value::Array(items) => items
                .iter()
                .try_for_each(|item| self.validate_entity(item, schema, path)),
            other => self.validate_entity(other, schema, path),
        }
    }

    fn validate_entity(
        &self,
        value: &Value,
        schema: &Schema,
        path: &str,
    ) -> Result<(), SchemaViolation> {
        let Value::Object(entity) = value else {
            return Err(SchemaViolation::NotAnEntity {
                field: display_path(path),
                found: JsonKind::of(value),
            });
        };

        let mut found = 0usize;
        for (name, node) in schema.fields() {
            let field = join(path, name);
            match node {
                SchemaNode::Nested(nested) => {
                    let child = entity
                        .get(name)
                        .ok_or(SchemaViolation::MissingField {
                            field: field.clone(),
                        })?;
                    found += 1;
                    self.validate_at(child, nested, &field)?;
                }
                SchemaNode::Field(tag) => match entity.get(name) {
                    Some(child) => {
                        found += 1;
                        check_type(child, tag.kind, &field)?;
                    }
                    None if tag.optional => {}
                    None => return Err(SchemaViolation::MissingField { field }),
                },
            }
        }

        if self.distinct_keys(entity, schema) != found {
            return Err(SchemaViolation::UnknownField {
                fields: entity
                    .keys()
                    .filter(|key| !schema.declares(key) && **key != self.id_field)
                    .map(|key| join(path, key))
                    .collect(),
            });
        }
        Ok(())
    }

    /// Keys counted against the declared fields; an undeclared id is ignored.
    fn distinct_keys(&self, entity: &Map<String, Value>, schema: &Schema) -> usize {
        let tolerated_id = entity.contains_key(&self.id_field) && !schema.declares(&self.id_field);
        entity.len() - usize::from(tolerated_id)
    }

    fn validate_leaf(
        &self,
        key: &str,
        value: &Value,
        schema: &Schema,
    ) -> Result<(), SchemaViolation> {
        let (head, below) = match key.split_once('.') {
            Some((head, below)) => (head, Some(below)),
            None => (key, None),
        };
        match (schema.get(head), below) {
            (None, _) => Err(SchemaViolation::UnknownField {
                fields: vec![key.to_string()],
            }),
            (Some(SchemaNode::Nested(nested)), None) => self.validate_at(value, nested, key),
            // A nested collection is an array; a dotted path cannot address
            // a field inside it.
            (Some(SchemaNode::Nested(_)), Some(_)) => Err(SchemaViolation::TypeMismatch {
                field: key.to_string(),
                expected: FieldKind::Array,
                found: JsonKind::Object,
            }),
            (Some(SchemaNode::Field(tag)), None) => check_type(value, tag.kind, key),
            // Below an opaque object declaration nothing more is known.
            (Some(SchemaNode::Field(tag)), Some(_)) if tag.kind == FieldKind::Object => Ok(()),
            (Some(SchemaNode::Field(tag)), Some(_)) => Err(SchemaViolation::TypeMismatch {
                field: key.to_string(),
                expected: tag.kind,
                found: JsonKind::Object,
            }),
        }
    }
}

fn check_type(value: &Value, expected: FieldKind, field: &str) -> Result<(), SchemaViolation> {
    let found = JsonKind::of(value);
    if expected.accepts(found) {
        Ok(())
    } else {
        Err(SchemaViolation::TypeMismatch {
            field: field.to_string(),
            expected,
            found,
        })
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}
