//! Core type definitions for nestdoc.
//!
//! This crate defines the fundamental types shared by the path compiler,
//! the schema validator and the document store:
//! - [`ObjectId`]: the store-native 12-byte identifier in its 24-hex form
//! - [`JsonKind`]: the runtime kind of a JSON value, used in type errors
//!
//! Entities themselves are plain [`serde_json::Value`] trees; `Value` is the
//! tagged union every recursive walk in the workspace matches on.

mod ids;
mod kind;

pub use ids::ObjectId;
pub use kind::{JsonKind, is_object_array};

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid object id {0:?}: expected 24 hex characters")]
    InvalidObjectId(String),
}
