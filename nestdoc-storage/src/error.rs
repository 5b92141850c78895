//! Error types for the storage layer.

use nestdoc_types::JsonKind;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Tenant record not found.
    #[error("tenant not found: {0}")]
    NotFound(String),

    /// Stored data that cannot be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// An update hit a value of the wrong kind (e.g. pushing onto a string).
    #[error("cannot apply update at `{path}`: found {found}")]
    TypeConflict { path: String, found: JsonKind },

    /// A pipeline or update that cannot be executed.
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),
}
