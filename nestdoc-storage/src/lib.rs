//! Document store contract and in-memory store for nestdoc.
//!
//! The store is the only place where compiled queries touch data. It holds
//! one JSON record per tenant:
//!
//! ```text
//! { username, environments: [ { <env>: { <collection>: [ {..., _id} ] } } ],
//!   entitySchemas: { <env>: { <collection>: <schema> } } }
//! ```
//!
//! # Architecture
//!
//! - [`DocumentStore`] runs read pipelines and single-document updates
//! - [`SchemaStore`] reads and writes per-collection schemas
//! - [`MemoryStore`] implements both over records held in memory; updates
//!   are applied to one record atomically under a write lock
//!
//! Update outcomes keep "no tenant matched" and "tenant matched, nothing
//! modified" apart so callers can report the right kind of not-found.

mod error;
mod memory;
mod pipeline;
mod store;
mod update;

pub use error::{StorageError, StorageResult};
pub use memory::{MemoryStore, SCHEMAS_FIELD, tenant_record};
pub use store::{DocumentStore, SchemaStore, UpdateOutcome};
