//! Error taxonomy surfaced to callers.

use nestdoc_model::SchemaViolation;
use nestdoc_query::{CompileError, PathError};
use nestdoc_storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Which part of the address could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No tenant document with the environment.
    Tenant,
    /// The tenant exists but the addressed subtree does not.
    TargetPath,
    /// The requested page lies beyond the last one.
    Page(u64),
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tenant => f.write_str("tenant or environment not found"),
            Self::TargetPath => f.write_str("target path not found"),
            Self::Page(page) => write!(f, "page {page} not found"),
        }
    }
}

/// Errors returned by [`CollectionService`](crate::CollectionService).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed path segments.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// The path does not fit the operation.
    #[error("invalid path: {0}")]
    InvalidOperation(#[from] CompileError),

    #[error("{0}")]
    NotFound(NotFoundReason),

    /// The payload does not satisfy the collection schema.
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// A paginated read whose path does not hold an array.
    #[error("paginated path `{0}` is not a collection")]
    InvalidPaginationTarget(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Whether this error means "invalid path" to callers.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath(_) | Self::InvalidOperation(_))
    }
}
