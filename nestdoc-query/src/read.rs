//! Read compilation.
//!
//! A read is a staged pipeline over tenant documents: select the tenant and
//! environment, walk down the path one collection at a time (unwinding and
//! matching each traversed id), filter the terminal collection, then re-root
//! onto the addressed members.

use crate::{CompilerConfig, FieldFilterCompiler, Filter, PathAddress};
use serde::{Deserialize, Serialize};

/// Working field holding the current subtree while the pipeline descends.
pub const NODE_FIELD: &str = "node";
/// Field carrying the collection size in paginated pipelines.
pub const TOTAL_FIELD: &str = "total";

const PAGE_PARAM: &str = "page";
const PER_PAGE_PARAM: &str = "per_page";

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Keep documents matching the filter.
    Match(Filter),
    /// Emit one document per element of the array at the path.
    Unwind(String),
    /// Replace each document by the projected fields.
    Project(Vec<Projection>),
    /// Replace each document by the object at the path.
    ReplaceRoot(String),
    Skip(u64),
    Limit(u64),
}

/// One output field of a [`Stage::Project`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub name: String,
    pub expr: ProjectExpr,
}

impl Projection {
    pub fn new(name: impl Into<String>, expr: ProjectExpr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// How a projected field is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectExpr {
    /// The value at a dotted path.
    Path(String),
    /// The elements of the array at `input` matching `cond`.
    FilterArray { input: String, cond: Filter },
    /// The length of the array at the path.
    Size(String),
}

/// A validated `page`/`per_page` request. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
}

impl Pagination {
    /// The pagination gate.
    ///
    /// Paginated iff the path is collection level and the query is exactly
    /// `page` and `per_page`, both positive integers. Any deviation is not
    /// an error: the read falls back to a plain (filtered) read.
    pub fn from_query<K, V>(path: &PathAddress, params: &[(K, V)]) -> Option<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if !path.is_collection_level() || params.len() != 2 {
            return None;
        }
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key.as_ref() == name)
                .and_then(|(_, value)| value.as_ref().trim().parse::<u64>().ok())
                .filter(|n| *n >= 1)
        };
        Some(Self {
            page: lookup(PAGE_PARAM)?,
            per_page: lookup(PER_PAGE_PARAM)?,
        })
    }

    /// Elements before the requested page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// A compiled read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadQuery {
    pub pipeline: Vec<Stage>,
    /// Set when the pagination gate passed; rows are then `{node, total}`.
    pub pagination: Option<Pagination>,
    /// The path addressed exactly one document by id.
    pub addressed_document: bool,
}

/// Compiles paths and query parameters into read pipelines.
pub struct ReadQueryCompiler {
    config: CompilerConfig,
}

impl ReadQueryCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles a read of `path` with raw query parameters.
    ///
    /// Parameters that do not pass the pagination gate become exact-match
    /// field filters on the terminal collection.
    pub fn compile<K, V>(
        &self,
        tenant: &str,
        environment: &str,
        path: &PathAddress,
        params: &[(K, V)],
    ) -> ReadQuery
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pipeline = self.narrow(tenant, environment, path);

        if let Some(pagination) = Pagination::from_query(path, params) {
            let projections = vec![
                Projection::new(NODE_FIELD, ProjectExpr::Path(NODE_FIELD.to_string())),
                Projection::new(TOTAL_FIELD, ProjectExpr::Size(NODE_FIELD.to_string())),
            ];
            pipeline.push(Stage::Project(projections));
            pipeline.push(Stage::Unwind(NODE_FIELD.to_string()));
            pipeline.push(Stage::Skip(pagination.skip()));
            pipeline.push(Stage::Limit(pagination.per_page));
            return ReadQuery {
                pipeline,
                pagination: Some(pagination),
                addressed_document: false,
            };
        }

        let mut clauses = Vec::new();
        if let Some(id) = path.terminal_id() {
            clauses.push(Filter::eq(self.config.id_field.as_str(), id));
        }
        if !params.is_empty() {
            let fields = params.iter().map(|(k, v)| (k.as_ref(), v.as_ref()));
            clauses.push(FieldFilterCompiler::compile(fields));
        }
        if !clauses.is_empty() {
            let filtered = ProjectExpr::FilterArray {
                input: NODE_FIELD.to_string(),
                cond: Filter::and(clauses),
            };
            pipeline.push(Stage::Project(vec![Projection::new(NODE_FIELD, filtered)]));
        }
        pipeline.push(Stage::Unwind(NODE_FIELD.to_string()));
        pipeline.push(Stage::ReplaceRoot(NODE_FIELD.to_string()));

        ReadQuery {
            pipeline,
            pagination: None,
            addressed_document: path.is_document_level(),
        }
    }

    /// Stages leaving one document per tenant whose `node` is the terminal
    /// collection.
    fn narrow(&self, tenant: &str, environment: &str, path: &PathAddress) -> Vec<Stage> {
        let scope = &self.config.scope_field;
        let mut pipeline = vec![
            Stage::Match(Filter::eq(self.config.tenant_field.as_str(), tenant)),
            Stage::Unwind(scope.clone()),
            Stage::Match(Filter::exists(format!("{scope}.{environment}"))),
        ];

        let steps = path.steps();
        let Some((first, _)) = steps.split_first() else {
            return pipeline;
        };
        pipeline.push(project_node(format!("{scope}.{environment}.{}", first.name)));

        for pair in steps.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if let Some(id) = current.id {
                pipeline.push(Stage::Unwind(NODE_FIELD.to_string()));
                let field = format!("{NODE_FIELD}.{}", self.config.id_field);
                pipeline.push(Stage::Match(Filter::eq(field, id)));
            }
            pipeline.push(project_node(format!("{NODE_FIELD}.{}", next.name)));
        }
        pipeline
    }
}

fn project_node(path: String) -> Stage {
    Stage::Project(vec![Projection::new(NODE_FIELD, ProjectExpr::Path(path))])
}
