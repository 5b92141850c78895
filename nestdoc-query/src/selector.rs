//! Update selectors with positional array filters.

use crate::{AliasStrategy, CompileError, CompilerConfig, Filter, PathStep};
use std::fmt;

/// One step of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorSegment {
    /// Descend into a named field.
    Field(String),
    /// Descend into every array element matching the filter bound to the alias.
    Positional(String),
}

/// A dotted update path such as `environments.$[envId].dev.users.$[usersId]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    segments: Vec<SelectorSegment>,
}

impl Selector {
    pub fn segments(&self) -> &[SelectorSegment] {
        &self.segments
    }

    pub fn push_field(&mut self, name: impl Into<String>) {
        self.segments.push(SelectorSegment::Field(name.into()));
    }

    pub fn push_positional(&mut self, alias: impl Into<String>) {
        let segment = SelectorSegment::Positional(alias.into());
        self.segments.push(segment);
    }

    /// This selector extended by a dotted field path.
    pub fn child(&self, dotted: &str) -> Self {
        let mut child = self.clone();
        for part in dotted.split('.') {
            child.push_field(part);
        }
        child
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                SelectorSegment::Field(name) => f.write_str(name)?,
                SelectorSegment::Positional(alias) => write!(f, "$[{alias}]")?,
            }
        }
        Ok(())
    }
}

/// A positional filter: the predicate an array element must satisfy to be
/// bound to `alias`. The predicate is relative to the element.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFilter {
    pub alias: String,
    pub predicate: Filter,
}

impl ArrayFilter {
    pub fn new(alias: impl Into<String>, predicate: Filter) -> Self {
        Self {
            alias: alias.into(),
            predicate,
        }
    }

    /// The predicate in store form, fields prefixed by the alias.
    pub fn qualified(&self) -> Filter {
        self.predicate.qualified(&self.alias)
    }
}

impl fmt::Display for ArrayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// Walks `steps` two segments at a time from the environment scope.
///
/// Each name appends a field; each id appends a positional placeholder and a
/// matching `<alias>._id == id` filter, in traversal order. The returned
/// filters must reach the store in this order.
pub(crate) fn scoped_selector(
    config: &CompilerConfig,
    environment: &str,
    steps: &[PathStep],
) -> Result<(Selector, Vec<ArrayFilter>), CompileError> {
    let mut selector = Selector::default();
    selector.push_field(config.scope_field.as_str());
    selector.push_positional(config.environment_alias.as_str());
    selector.push_field(environment);

    let environment_filter = Filter::exists(environment);
    let mut filters = vec![ArrayFilter::new(config.environment_alias.as_str(), environment_filter)];

    for (depth, step) in steps.iter().enumerate() {
        selector.push_field(step.name.as_str());
        if let Some(id) = step.id {
            let alias = match config.alias_strategy {
                AliasStrategy::CollectionName => format!("{}Id", step.name),
                AliasStrategy::Depth => format!("d{depth}Id"),
            };
            if filters.iter().any(|f| f.alias == alias) {
                return Err(CompileError::AmbiguousAlias { alias });
            }
            selector.push_positional(alias.as_str());
            filters.push(ArrayFilter::new(alias, Filter::eq(config.id_field.as_str(), id)));
        }
    }
    Ok((selector, filters))
}
