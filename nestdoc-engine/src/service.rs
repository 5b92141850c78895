use crate::{EngineConfig, EngineError, EngineResult, LinkConfig, NotFoundReason};
use nestdoc_model::{Schema, SchemaValidator, SchemaViolation};
use nestdoc_query::{
    IdGenerator, PageEnvelope, PathAddress, RandomIds, ReadError, ReadQueryCompiler, WriteIntent,
    WriteQuery, WriteQueryCompiler, augment_links,
};
use nestdoc_storage::{DocumentStore, SchemaStore, StorageError};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Per-write switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Skip schema validation; the write proceeds unchecked.
    pub force: bool,
}

impl WriteOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// The shape of a successful read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// A paginated collection read.
    Page(PageEnvelope),
    /// A plain collection read; may be empty.
    Items(Vec<Value>),
    /// The one document addressed by id.
    Document(Value),
}

/// Reads and writes nested collections of tenant documents.
///
/// Paths are slash-separated and start below the tenant and environment,
/// e.g. `users/<id>/posts`.
pub struct CollectionService<G = RandomIds> {
    documents: Arc<dyn DocumentStore>,
    schemas: Arc<dyn SchemaStore>,
    reader: ReadQueryCompiler,
    writer: WriteQueryCompiler<G>,
    validator: SchemaValidator,
    links: LinkConfig,
}

impl CollectionService<RandomIds> {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        schemas: Arc<dyn SchemaStore>,
        config: EngineConfig,
    ) -> Self {
        Self::with_generator(documents, schemas, config, RandomIds)
    }
}

impl<G: IdGenerator> CollectionService<G> {
    /// Creates a service drawing fresh member ids from `generator`.
    pub fn with_generator(
        documents: Arc<dyn DocumentStore>,
        schemas: Arc<dyn SchemaStore>,
        config: EngineConfig,
        generator: G,
    ) -> Self {
        let EngineConfig { compiler, links } = config;
        Self {
            documents,
            schemas,
            validator: SchemaValidator::new(compiler.id_field.clone()),
            reader: ReadQueryCompiler::new(compiler.clone()),
            writer: WriteQueryCompiler::with_generator(compiler, generator),
            links,
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Reads `path` with raw query parameters.
    ///
    /// Exactly `page` and `per_page` on a collection path paginate; any
    /// other parameters filter the terminal collection by equality.
    pub async fn fetch<K, V>(
        &self,
        tenant: &str,
        environment: &str,
        path: &str,
        params: &[(K, V)],
    ) -> EngineResult<ReadOutcome>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let path = PathAddress::from_path_str(path)?;
        let query = self.reader.compile(tenant, environment, &path, params);
        let mut rows = self.documents.aggregate(&query.pipeline).await?;
        let resource = self.links.resource(&path.to_path_string());
        debug!(tenant, environment, %path, rows = rows.len(), "read executed");

        if let Some(pagination) = query.pagination {
            let page = PageEnvelope::from_rows(&resource, pagination, rows)
                .map_err(|e| pagination_error(e, &path))?;
            return Ok(ReadOutcome::Page(page));
        }

        augment_links(
            &mut rows,
            &resource,
            query.addressed_document,
            self.validator.id_field(),
        );
        if query.addressed_document {
            rows.into_iter()
                .next()
                .map(ReadOutcome::Document)
                .ok_or(EngineError::NotFound(NotFoundReason::TargetPath))
        } else {
            Ok(ReadOutcome::Items(rows))
        }
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Replaces the whole collection at `path`.
    pub async fn replace_collection(
        &self,
        tenant: &str,
        environment: &str,
        path: &str,
        items: Vec<Value>,
        options: WriteOptions,
    ) -> EngineResult<()> {
        let path = PathAddress::from_path_str(path)?;
        let payload = Value::Array(items.clone());
        let intent = WriteIntent::ReplaceCollection { items };
        let query = self.writer.compile(tenant, environment, &path, intent)?;
        self.gate(tenant, environment, &path, options, |validator, schema| {
            validator.validate(&payload, schema)
        })
        .await?;
        self.execute(tenant, &path, &query).await
    }

    /// Appends members to the collection at `path`, creating it if absent.
    pub async fn append(
        &self,
        tenant: &str,
        environment: &str,
        path: &str,
        items: Vec<Value>,
        options: WriteOptions,
    ) -> EngineResult<()> {
        let path = PathAddress::from_path_str(path)?;
        let payload = Value::Array(items.clone());
        let intent = WriteIntent::AppendItems { items };
        let query = self.writer.compile(tenant, environment, &path, intent)?;
        self.gate(tenant, environment, &path, options, |validator, schema| {
            validator.validate(&payload, schema)
        })
        .await?;
        self.execute(tenant, &path, &query).await
    }

    /// Replaces the document at `path`, keeping its id.
    pub async fn replace_document(
        &self,
        tenant: &str,
        environment: &str,
        path: &str,
        document: Value,
        options: WriteOptions,
    ) -> EngineResult<()> {
        let path = PathAddress::from_path_str(path)?;
        let payload = document.clone();
        let intent = WriteIntent::ReplaceDocument { document };
        let query = self.writer.compile(tenant, environment, &path, intent)?;
        self.gate(tenant, environment, &path, options, |validator, schema| {
            validator.validate(&payload, schema)
        })
        .await?;
        self.execute(tenant, &path, &query).await
    }

    /// Sets individual fields of the document at `path`; fields not named
    /// are left alone.
    pub async fn merge(
        &self,
        tenant: &str,
        environment: &str,
        path: &str,
        fields: Map<String, Value>,
        options: WriteOptions,
    ) -> EngineResult<()> {
        let path = PathAddress::from_path_str(path)?;
        let leaves = self.writer.merge_leaves(&fields)?;
        let intent = WriteIntent::MergeFields { fields };
        let query = self.writer.compile(tenant, environment, &path, intent)?;
        self.gate(tenant, environment, &path, options, |validator, schema| {
            validator.validate_partial(leaves.iter().map(|(k, v)| (k.as_str(), v)), schema)
        })
        .await?;
        self.execute(tenant, &path, &query).await
    }

    /// Deletes the document at a document path, or the members of a
    /// collection matching every `field == value` pair (all members when
    /// no pairs are given).
    pub async fn delete<K, V>(
        &self,
        tenant: &str,
        environment: &str,
        path: &str,
        fields: &[(K, V)],
    ) -> EngineResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let path = PathAddress::from_path_str(path)?;
        let fields = fields
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        let intent = WriteIntent::DeleteMatching { fields };
        let query = self.writer.compile(tenant, environment, &path, intent)?;
        self.execute(tenant, &path, &query).await
    }

    // ── Schemas ──────────────────────────────────────────────────

    /// Declares the schema of a top-level collection.
    pub async fn define_schema(
        &self,
        tenant: &str,
        environment: &str,
        collection: &str,
        schema: Schema,
    ) -> EngineResult<()> {
        self.schemas
            .set_schema(tenant, environment, collection, schema)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => EngineError::NotFound(NotFoundReason::Tenant),
                other => other.into(),
            })?;
        info!(tenant, environment, collection, "schema defined");
        Ok(())
    }

    /// The schema of a top-level collection, if it is validated.
    pub async fn schema(
        &self,
        tenant: &str,
        environment: &str,
        collection: &str,
    ) -> EngineResult<Option<Schema>> {
        Ok(self.schemas.get_schema(tenant, environment, collection).await?)
    }

    // ── Internals ────────────────────────────────────────────────

    /// Runs `check` against the schema governing the terminal collection of
    /// `path`. Collections without a schema are unvalidated.
    async fn gate<F>(
        &self,
        tenant: &str,
        environment: &str,
        path: &PathAddress,
        options: WriteOptions,
        check: F,
    ) -> EngineResult<()>
    where
        F: FnOnce(&SchemaValidator, &Schema) -> Result<(), SchemaViolation>,
    {
        if options.force {
            debug!(tenant, environment, %path, "validation skipped");
            return Ok(());
        }
        let collection = path.root_name();
        let stored = self.schemas.get_schema(tenant, environment, collection);
        let Some(root) = stored.await? else {
            return Ok(());
        };
        match root.resolve(path.collection_names().skip(1)) {
            Ok(Some(schema)) => check(&self.validator, schema)?,
            // Below a plain field declaration nothing is known.
            Ok(None) => {}
            Err(name) => return Err(SchemaViolation::UnknownField { fields: vec![name] }.into()),
        }
        Ok(())
    }

    async fn execute(
        &self,
        tenant: &str,
        path: &PathAddress,
        query: &WriteQuery,
    ) -> EngineResult<()> {
        let outcome = self.documents.update_one(query).await?;
        if outcome.matched == 0 {
            debug!(tenant, %path, "write matched no tenant");
            return Err(EngineError::NotFound(NotFoundReason::Tenant));
        }
        if outcome.modified == 0 {
            debug!(tenant, %path, "write reached nothing");
            return Err(EngineError::NotFound(NotFoundReason::TargetPath));
        }
        info!(tenant, %path, selector = %query.selector, "write applied");
        Ok(())
    }
}

fn pagination_error(err: ReadError, path: &PathAddress) -> EngineError {
    match err {
        ReadError::PageOutOfRange { page } => EngineError::NotFound(NotFoundReason::Page(page)),
        ReadError::NotACollection => EngineError::InvalidPaginationTarget(path.to_path_string()),
    }
}
