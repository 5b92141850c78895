//! Error types for schema decoding and validation.

use crate::FieldKind;
use nestdoc_types::JsonKind;
use thiserror::Error;

/// A schema document that cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The schema (or a nested schema) is not a JSON object.
    #[error("schema must be an object, got {0}")]
    NotAnObject(JsonKind),

    /// A type tag string is not one of the known kinds.
    #[error("invalid type tag {tag:?} for field `{field}`")]
    InvalidTypeTag { field: String, tag: String },

    /// A field declaration is neither a type tag nor a nested schema.
    #[error("invalid declaration for field `{field}`: got {found}")]
    InvalidNode { field: String, found: JsonKind },
}

/// The first violation found while validating an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    /// A mandatory field (or a nested collection) is absent.
    #[error("missing mandatory field `{field}`")]
    MissingField { field: String },

    /// The entity carries fields the schema does not declare.
    #[error("unknown fields: {}", .fields.join(", "))]
    UnknownField { fields: Vec<String> },

    /// A declared field holds a value of the wrong kind.
    #[error("field `{field}`: expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        found: JsonKind,
    },

    /// Something other than an object (or list of objects) was validated.
    #[error("expected an entity object at `{field}`, got {found}")]
    NotAnEntity { field: String, found: JsonKind },
}
