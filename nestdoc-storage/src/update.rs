//! Update execution with positional array filters.

use crate::{StorageError, StorageResult};
use nestdoc_query::{Filter, SelectorSegment, UpdateOp, WriteQuery};
use nestdoc_types::JsonKind;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Where a selector ends: a named field of an object, or an array element
/// bound by a positional filter.
enum Slot<'a> {
    Field(&'a mut Map<String, Value>, &'a str),
    Element(&'a mut Value),
}

/// Applies `query.update` to `doc`. Returns whether the update reached its
/// target (for pulls: whether anything was removed).
pub(crate) fn apply(doc: &mut Value, query: &WriteQuery) -> StorageResult<bool> {
    let filters: HashMap<&str, &Filter> = query
        .array_filters
        .iter()
        .map(|f| (f.alias.as_str(), &f.predicate))
        .collect();

    match &query.update {
        UpdateOp::Set(clauses) => {
            let mut reached = false;
            for clause in clauses {
                let value = &clause.value;
                let path = clause.selector.to_string();
                reached |= walk(doc, clause.selector.segments(), &path, &filters, &mut |slot| {
                    match slot {
                        Slot::Field(map, name) => {
                            map.insert(name.to_string(), value.clone());
                        }
                        Slot::Element(element) => *element = value.clone(),
                    }
                    Ok(true)
                })?;
            }
            Ok(reached)
        }
        UpdateOp::PushEach { selector, items } => {
            let path = selector.to_string();
            walk(doc, selector.segments(), &path, &filters, &mut |slot| {
                let target = match slot {
                    Slot::Field(map, name) => map
                        .entry(name.to_string())
                        .or_insert_with(|| Value::Array(Vec::new())),
                    Slot::Element(element) => element,
                };
                match target {
                    Value::Array(array) => {
                        array.extend(items.iter().cloned());
                        Ok(true)
                    }
                    other => Err(StorageError::TypeConflict {
                        path: path.clone(),
                        found: JsonKind::of(other),
                    }),
                }
            })
        }
        UpdateOp::Pull { selector, filter } => {
            let path = selector.to_string();
            walk(doc, selector.segments(), &path, &filters, &mut |slot| {
                let target = match slot {
                    Slot::Field(map, name) => match map.get_mut(name) {
                        Some(target) => target,
                        None => return Ok(false),
                    },
                    Slot::Element(element) => element,
                };
                match target {
                    Value::Array(array) => {
                        let before = array.len();
                        array.retain(|item| !filter.matches(item));
                        Ok(array.len() < before)
                    }
                    other => Err(StorageError::TypeConflict {
                        path: path.clone(),
                        found: JsonKind::of(other),
                    }),
                }
            })
        }
    }
}

/// Resolves `segments` below `value`, calling `action` on every slot reached.
///
/// Missing plain fields are created only when another plain field follows;
/// a missing field in front of a positional placeholder stops the walk. An
/// existing non-object in front of a plain field is a conflict on `path`.
fn walk(
    value: &mut Value,
    segments: &[SelectorSegment],
    path: &str,
    filters: &HashMap<&str, &Filter>,
    action: &mut dyn FnMut(Slot<'_>) -> StorageResult<bool>,
) -> StorageResult<bool> {
    match segments {
        [] => Ok(false),
        [SelectorSegment::Field(name)] => match value {
            Value::Object(map) => action(Slot::Field(map, name)),
            _ => Ok(false),
        },
        [SelectorSegment::Field(name), rest @ ..] => {
            let Value::Object(map) = value else {
                return Ok(false);
            };
            let field_follows = matches!(rest.first(), Some(SelectorSegment::Field(_)));
            match map.get(name) {
                None if !field_follows => return Ok(false),
                None => {
                    map.insert(name.clone(), Value::Object(Map::new()));
                }
                Some(child) if field_follows && !child.is_object() => {
                    return Err(StorageError::TypeConflict {
                        path: path.to_string(),
                        found: JsonKind::of(child),
                    });
                }
                Some(_) => {}
            }
            match map.get_mut(name) {
                Some(child) => walk(child, rest, path, filters, action),
                None => Ok(false),
            }
        }
        [SelectorSegment::Positional(alias), rest @ ..] => {
            let filter = filters.get(alias.as_str()).ok_or_else(|| {
                StorageError::InvalidPipeline(format!("no array filter bound to `{alias}`"))
            })?;
            let Value::Array(items) = value else {
                return Ok(false);
            };
            let mut reached = false;
            for item in items.iter_mut().filter(|item| filter.matches(item)) {
                reached |= if rest.is_empty() {
                    action(Slot::Element(item))?
                } else {
                    walk(item, rest, path, filters, action)?
                };
            }
            Ok(reached)
        }
    }
}
