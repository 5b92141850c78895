//! Collection service for nestdoc.
//!
//! Wires the pieces of a request together: path parsing, the schema
//! validation gate, query compilation, store execution, and mapping of store
//! outcomes onto the error taxonomy.
//!
//! # Example
//!
//! ```no_run
//! use nestdoc_engine::{CollectionService, EngineConfig, WriteOptions};
//! use nestdoc_storage::{MemoryStore, tenant_record};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn demo() -> nestdoc_engine::EngineResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! store.insert_tenant(tenant_record("alice", &["dev"])).await?;
//!
//! let service = CollectionService::new(store.clone(), store, EngineConfig::default());
//! service
//!     .append("alice", "dev", "users", vec![json!({"name": "ann"})], WriteOptions::default())
//!     .await?;
//! let users = service.fetch("alice", "dev", "users", &[] as &[(&str, &str)]).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod service;

pub use config::{EngineConfig, LinkConfig};
pub use error::{EngineError, EngineResult, NotFoundReason};
pub use service::{CollectionService, ReadOutcome, WriteOptions};
