//! Path addressing and query compilation for nestdoc.
//!
//! Turns REST-style paths over one JSON document per tenant into store
//! operations. Every tenant document has the shape
//! `{ username, environments: [ { <env>: { <collection>: [...] } } ], entitySchemas }`
//! and nested collections are addressed by alternating name/id segments:
//! `users/<id>/posts/<id>`.
//!
//! # Components
//!
//! - [`PathAddress`]: validated, classified path segments
//! - [`FieldFilterCompiler`]: exact-match filters from flat field maps
//! - [`IdentityAssigner`]: stamps ids onto nested collection members
//! - [`WriteQueryCompiler`]: selector + positional filters + update operation
//! - [`ReadQueryCompiler`]: staged read pipeline and pagination gate
//! - [`PageEnvelope`] / [`augment_links`]: shaping of read results
//!
//! Everything here is synchronous and side-effect free; executing the
//! compiled operations is the store's job.

mod config;
mod envelope;
mod error;
mod filter;
mod identity;
mod links;
mod path;
mod read;
mod selector;
mod write;

pub use config::{AliasStrategy, CompilerConfig};
pub use envelope::{PageEnvelope, PageLinks};
pub use error::{CompileError, Level, PathError, ReadError};
pub use filter::{FieldFilterCompiler, Filter, coerce_literal, field_values, values_equal};
pub use identity::{IdGenerator, IdentityAssigner, RandomIds, SequentialIds};
pub use links::{LINKS_FIELD, augment_links};
pub use path::{PathAddress, PathStep};
pub use read::{
    NODE_FIELD, Pagination, ProjectExpr, Projection, ReadQuery, ReadQueryCompiler, Stage,
    TOTAL_FIELD,
};
pub use selector::{ArrayFilter, Selector, SelectorSegment};
pub use write::{SetClause, UpdateOp, WriteIntent, WriteQuery, WriteQueryCompiler};
