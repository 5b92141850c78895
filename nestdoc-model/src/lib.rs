//! Entity schema model for nestdoc.
//!
//! Defines the per-collection type schema and the validator that enforces it:
//! - [`Schema`]: ordered field declarations, possibly nesting further schemas
//! - [`TypeTag`] / [`FieldKind`]: a declared primitive kind plus optionality
//! - [`SchemaValidator`]: the recursive, fail-fast checker used as the write gate
//!
//! A missing schema means "unvalidated", never "empty". Schemas are persisted
//! by the storage layer.

mod error;
mod schema;
mod validator;

pub use error::{SchemaError, SchemaViolation};
pub use schema::{FieldKind, Schema, SchemaNode, TypeTag};
pub use validator::SchemaValidator;
