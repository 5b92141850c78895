//! Error types for path parsing and query compilation.

use nestdoc_types::JsonKind;
use std::fmt;
use thiserror::Error;

/// Whether a path addresses a whole collection or one of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Collection,
    Document,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => f.write_str("collection"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// A path that cannot address anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// No segments at all.
    #[error("path is empty")]
    Empty,

    /// A collection name segment is empty.
    #[error("empty collection name at segment {index}")]
    EmptyName { index: usize },

    /// An id segment is not a valid store id.
    #[error("invalid id segment {segment:?} at position {index}")]
    InvalidId { segment: String, index: usize },
}

/// A write intent that cannot be compiled against its path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The intent needs the other path arity.
    #[error("{operation} requires a {expected}-level path")]
    WrongLevel {
        operation: &'static str,
        expected: Level,
    },

    /// Two positional filters would share one alias.
    #[error("positional alias `{alias}` is bound twice in one path")]
    AmbiguousAlias { alias: String },

    /// The field is managed by the engine.
    #[error("field `{field}` cannot be written directly")]
    ImmutableField { field: String },

    /// A merge with nothing to set.
    #[error("merge contains no fields")]
    EmptyMerge,

    /// A collection member or document payload that is not an object.
    #[error("expected an object payload, got {found}")]
    NotAnObject { found: JsonKind },
}

/// A read result that cannot be shaped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The requested page lies beyond the last page.
    #[error("page {page} is beyond the last page")]
    PageOutOfRange { page: u64 },

    /// The paginated path does not hold an array.
    #[error("paginated path does not address a collection")]
    NotACollection,
}
