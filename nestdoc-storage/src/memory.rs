//! In-memory tenant records.

use crate::{
    DocumentStore, SchemaStore, StorageError, StorageResult, UpdateOutcome, pipeline, update,
};
use async_trait::async_trait;
use nestdoc_model::Schema;
use nestdoc_query::{CompilerConfig, Stage, WriteQuery};
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;
use tracing::debug;

/// Field of a tenant record holding per-environment schemas.
pub const SCHEMAS_FIELD: &str = "entitySchemas";

/// Builds an empty tenant record with the given environments.
pub fn tenant_record(username: &str, environments: &[&str]) -> Value {
    let environments: Vec<Value> = environments
        .iter()
        .map(|env| json!({ (*env): {} }))
        .collect();
    json!({
        "username": username,
        "environments": environments,
        SCHEMAS_FIELD: {},
    })
}

/// A [`DocumentStore`] and [`SchemaStore`] over records held in memory.
///
/// Updates clone the matched record, apply the operation and swap the
/// result in, so a failing update leaves the record untouched.
pub struct MemoryStore {
    tenants: RwLock<Vec<Value>>,
    config: CompilerConfig,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    /// Creates an empty store using `config` for the record field names.
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            tenants: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Seeds the store with existing records.
    pub fn with_tenants(mut self, records: impl IntoIterator<Item = Value>) -> Self {
        self.tenants.get_mut().extend(records);
        self
    }

    /// Adds a tenant record, replacing any record with the same username.
    pub async fn insert_tenant(&self, record: Value) -> StorageResult<()> {
        let name = self.username_of(&record)?.to_string();
        let mut tenants = self.tenants.write().await;
        tenants.retain(|existing| self.username_of(existing).ok() != Some(name.as_str()));
        tenants.push(record);
        debug!(tenant = %name, "tenant record inserted");
        Ok(())
    }

    /// A snapshot of one tenant record.
    pub async fn tenant(&self, username: &str) -> Option<Value> {
        let tenants = self.tenants.read().await;
        tenants
            .iter()
            .find(|record| self.username_of(record).ok() == Some(username))
            .cloned()
    }

    fn username_of<'a>(&self, record: &'a Value) -> StorageResult<&'a str> {
        record
            .get(&self.config.tenant_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StorageError::InvalidData(format!(
                    "tenant record without a string `{}` field",
                    self.config.tenant_field
                ))
            })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn aggregate(&self, stages: &[Stage]) -> StorageResult<Vec<Value>> {
        let snapshot = self.tenants.read().await.clone();
        let rows = pipeline::run(snapshot, stages)?;
        debug!(stages = stages.len(), rows = rows.len(), "pipeline run");
        Ok(rows)
    }

    async fn update_one(&self, query: &WriteQuery) -> StorageResult<UpdateOutcome> {
        let mut tenants = self.tenants.write().await;
        let target = &query.target;
        let Some(record) = tenants.iter_mut().find(|record| target.matches(record)) else {
            debug!(filter = %query.target, "update matched no tenant");
            return Ok(UpdateOutcome::default());
        };

        let mut working = record.clone();
        let reached = update::apply(&mut working, query)?;
        if reached {
            *record = working;
        }
        debug!(selector = %query.selector, reached, "update applied");
        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(reached),
        })
    }
}

#[async_trait]
impl SchemaStore for MemoryStore {
    async fn get_schema(
        &self,
        tenant: &str,
        environment: &str,
        collection: &str,
    ) -> StorageResult<Option<Schema>> {
        let Some(record) = self.tenant(tenant).await else {
            return Ok(None);
        };
        let Some(stored) = record
            .get(SCHEMAS_FIELD)
            .and_then(|schemas| schemas.get(environment))
            .and_then(|env| env.get(collection))
        else {
            return Ok(None);
        };
        match Schema::try_from(stored.clone()) {
            Ok(schema) => Ok(Some(schema)),
            Err(e) => Err(StorageError::InvalidData(format!("{environment}/{collection}: {e}"))),
        }
    }

    async fn set_schema(
        &self,
        tenant: &str,
        environment: &str,
        collection: &str,
        schema: Schema,
    ) -> StorageResult<()> {
        let mut tenants = self.tenants.write().await;
        let record = tenants
            .iter_mut()
            .find(|record| self.username_of(record).ok() == Some(tenant))
            .ok_or_else(|| StorageError::NotFound(tenant.to_string()))?;
        let Value::Object(fields) = record else {
            let message = format!("tenant record for {tenant} is not an object");
            return Err(StorageError::InvalidData(message));
        };

        let schemas = object_entry(fields, SCHEMAS_FIELD)?;
        let env = object_entry(schemas, environment)?;
        env.insert(collection.to_string(), Value::from(schema));
        debug!(tenant, environment, collection, "schema stored");
        Ok(())
    }
}

/// The object under `key`, created if absent.
fn object_entry<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> StorageResult<&'a mut Map<String, Value>> {
    match map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(inner) => Ok(inner),
        _ => Err(StorageError::InvalidData(format!("`{key}` is not an object"))),
    }
}
