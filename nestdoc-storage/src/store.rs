use crate::StorageResult;
use async_trait::async_trait;
use nestdoc_model::Schema;
use nestdoc_query::{Stage, WriteQuery};
use serde_json::Value;

/// Result of a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Tenant documents matched by the target filter (0 or 1).
    pub matched: u64,
    /// Matched documents where the update reached its target.
    pub modified: u64,
}

/// Executes compiled reads and writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Runs a staged read pipeline over all tenant records.
    async fn aggregate(&self, pipeline: &[Stage]) -> StorageResult<Vec<Value>>;

    /// Applies one compiled update to the first record matching its target.
    async fn update_one(&self, query: &WriteQuery) -> StorageResult<UpdateOutcome>;
}

/// Per (tenant, environment, top-level collection) schema storage.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Returns the schema, or `None` when the collection is unvalidated.
    async fn get_schema(
        &self,
        tenant: &str,
        environment: &str,
        collection: &str,
    ) -> StorageResult<Option<Schema>>;

    /// Creates or replaces a schema.
    async fn set_schema(
        &self,
        tenant: &str,
        environment: &str,
        collection: &str,
        schema: Schema,
    ) -> StorageResult<()>;
}
