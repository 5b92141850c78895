//! Write compilation.
//!
//! Each intent becomes a single update against one tenant document:
//! a document filter, an update operation whose paths run through
//! positional placeholders, and the ordered positional filters binding them.

use crate::selector::scoped_selector;
use crate::{
    ArrayFilter, CompileError, CompilerConfig, FieldFilterCompiler, Filter, IdGenerator,
    IdentityAssigner, Level, PathAddress, RandomIds, Selector, coerce_literal,
};
use nestdoc_types::{JsonKind, is_object_array};
use serde_json::{Map, Value};

/// What a write should do at its path.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteIntent {
    /// Replace the whole collection (collection level).
    ReplaceCollection { items: Vec<Value> },
    /// Append members to the collection (collection level).
    AppendItems { items: Vec<Value> },
    /// Replace one member wholesale (document level).
    ReplaceDocument { document: Value },
    /// Remove members: by field equality at collection level, or the
    /// addressed member at document level.
    DeleteMatching { fields: Vec<(String, String)> },
    /// Set individual leaves of one member (document level).
    MergeFields { fields: Map<String, Value> },
}

impl WriteIntent {
    fn name(&self) -> &'static str {
        match self {
            Self::ReplaceCollection { .. } => "replace collection",
            Self::AppendItems { .. } => "append items",
            Self::ReplaceDocument { .. } => "replace document",
            Self::DeleteMatching { .. } => "delete",
            Self::MergeFields { .. } => "merge fields",
        }
    }
}

/// One `$set`-style assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub selector: Selector,
    pub value: Value,
}

/// The update applied to the matched tenant document.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Assign every clause.
    Set(Vec<SetClause>),
    /// Append each item to the array at `selector`, creating it if absent.
    PushEach {
        selector: Selector,
        items: Vec<Value>,
    },
    /// Remove every element of the array at `selector` matching `filter`.
    Pull { selector: Selector, filter: Filter },
}

/// A compiled write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteQuery {
    /// Selects the tenant document; matches only if the environment exists.
    pub target: Filter,
    /// The addressed location (for document deletes, the parent collection).
    pub selector: Selector,
    /// Positional filters in traversal order.
    pub array_filters: Vec<ArrayFilter>,
    pub update: UpdateOp,
}

/// Compiles [`WriteIntent`]s into [`WriteQuery`]s.
pub struct WriteQueryCompiler<G = RandomIds> {
    config: CompilerConfig,
    assigner: IdentityAssigner<G>,
}

impl WriteQueryCompiler<RandomIds> {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_generator(config, RandomIds)
    }
}

impl<G: IdGenerator> WriteQueryCompiler<G> {
    /// Creates a compiler drawing fresh ids from `generator`.
    pub fn with_generator(config: CompilerConfig, generator: G) -> Self {
        let assigner = IdentityAssigner::with_generator(config.id_field.clone(), generator);
        Self { config, assigner }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn assigner(&self) -> &IdentityAssigner<G> {
        &self.assigner
    }

    /// Compiles one intent for `path` inside `tenant`/`environment`.
    pub fn compile(
        &self,
        tenant: &str,
        environment: &str,
        path: &PathAddress,
        intent: WriteIntent,
    ) -> Result<WriteQuery, CompileError> {
        let operation = intent.name();
        let (selector, array_filters, update) = match intent {
            WriteIntent::ReplaceCollection { items } => {
                require(path, Level::Collection, operation)?;
                let (selector, filters) = self.scope(environment, path)?;
                let items = self.stamped_items(items)?;
                let update = UpdateOp::Set(vec![SetClause {
                    selector: selector.clone(),
                    value: Value::Array(items),
                }]);
                (selector, filters, update)
            }
            WriteIntent::AppendItems { items } => {
                require(path, Level::Collection, operation)?;
                let (selector, filters) = self.scope(environment, path)?;
                let items = self.stamped_items(items)?;
                let update = UpdateOp::PushEach {
                    selector: selector.clone(),
                    items,
                };
                (selector, filters, update)
            }
            WriteIntent::ReplaceDocument { mut document } => {
                require(path, Level::Document, operation)?;
                if !document.is_object() {
                    return Err(CompileError::NotAnObject {
                        found: JsonKind::of(&document),
                    });
                }
                let (selector, filters) = self.scope(environment, path)?;
                self.assigner.assign_ids(&mut document, path.terminal_id());
                let update = UpdateOp::Set(vec![SetClause {
                    selector: selector.clone(),
                    value: document,
                }]);
                (selector, filters, update)
            }
            WriteIntent::DeleteMatching { fields } => {
                let parent = path.parent_collection();
                match (parent, path.terminal_id()) {
                    (Some(parent), Some(id)) => {
                        let (selector, filters) = self.scope(environment, &parent)?;
                        let update = UpdateOp::Pull {
                            selector: selector.clone(),
                            filter: Filter::eq(self.config.id_field.as_str(), id),
                        };
                        (selector, filters, update)
                    }
                    _ => {
                        let (selector, filters) = self.scope(environment, path)?;
                        let update = UpdateOp::Pull {
                            selector: selector.clone(),
                            filter: FieldFilterCompiler::compile(fields),
                        };
                        (selector, filters, update)
                    }
                }
            }
            WriteIntent::MergeFields { fields } => {
                require(path, Level::Document, operation)?;
                let leaves = self.merge_leaves(&fields)?;
                let (selector, filters) = self.scope(environment, path)?;
                let clauses = leaves
                    .into_iter()
                    .map(|(field, value)| SetClause {
                        selector: selector.child(&field),
                        value,
                    })
                    .collect();
                (selector, filters, UpdateOp::Set(clauses))
            }
        };

        Ok(WriteQuery {
            target: self.tenant_filter(tenant, environment),
            selector,
            array_filters,
            update,
        })
    }

    /// Flattens a merge payload into `(dotted leaf, value)` pairs.
    ///
    /// Non-empty objects are descended into; string leaves are coerced with
    /// [`coerce_literal`]; arrays of objects are stamped with ids. The id
    /// field cannot be merged.
    pub fn merge_leaves(
        &self,
        fields: &Map<String, Value>,
    ) -> Result<Vec<(String, Value)>, CompileError> {
        if fields.contains_key(&self.config.id_field) {
            return Err(CompileError::ImmutableField {
                field: self.config.id_field.clone(),
            });
        }
        let mut leaves = Vec::new();
        self.flatten_into("", fields, &mut leaves);
        if leaves.is_empty() {
            return Err(CompileError::EmptyMerge);
        }
        Ok(leaves)
    }

    fn flatten_into(
        &self,
        prefix: &str,
        fields: &Map<String, Value>,
        leaves: &mut Vec<(String, Value)>,
    ) {
        for (name, value) in fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match value {
                Value::Object(nested) if !nested.is_empty() => {
                    self.flatten_into(&path, nested, leaves)
                }
                Value::String(raw) => leaves.push((path, coerce_literal(raw))),
                other => {
                    let mut leaf = other.clone();
                    if is_object_array(&leaf) {
                        self.assigner.assign_ids(&mut leaf, None);
                    }
                    leaves.push((path, leaf));
                }
            }
        }
    }

    fn stamped_items(&self, mut items: Vec<Value>) -> Result<Vec<Value>, CompileError> {
        if let Some(bad) = items.iter().find(|item| !item.is_object()) {
            return Err(CompileError::NotAnObject {
                found: JsonKind::of(bad),
            });
        }
        for item in &mut items {
            self.assigner.assign_ids(item, None);
        }
        Ok(items)
    }

    fn scope(
        &self,
        environment: &str,
        path: &PathAddress,
    ) -> Result<(Selector, Vec<ArrayFilter>), CompileError> {
        scoped_selector(&self.config, environment, path.steps())
    }

    fn tenant_filter(&self, tenant: &str, environment: &str) -> Filter {
        Filter::and([
            Filter::eq(self.config.tenant_field.as_str(), tenant),
            Filter::exists(format!("{}.{}", self.config.scope_field, environment)),
        ])
    }
}

fn require(
    path: &PathAddress,
    expected: Level,
    operation: &'static str,
) -> Result<(), CompileError> {
    let actual = if path.is_document_level() {
        Level::Document
    } else {
        Level::Collection
    };
    if actual == expected {
        Ok(())
    } else {
        Err(CompileError::WrongLevel {
            operation,
            expected,
        })
    }
}
