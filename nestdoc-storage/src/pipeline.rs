//! Read pipeline execution.

use crate::{StorageError, StorageResult};
use nestdoc_query::{ProjectExpr, Projection, Stage};
use nestdoc_types::JsonKind;
use serde_json::{Map, Value};

/// Runs `pipeline` over `docs`, stage by stage.
pub(crate) fn run(mut docs: Vec<Value>, pipeline: &[Stage]) -> StorageResult<Vec<Value>> {
    for stage in pipeline {
        docs = match stage {
            Stage::Match(filter) => {
                docs.retain(|doc| filter.matches(doc));
                docs
            }
            Stage::Unwind(path) => docs.into_iter().flat_map(|d| unwind(d, path)).collect(),
            Stage::Project(projections) => docs.iter().map(|d| project(d, projections)).collect(),
            Stage::ReplaceRoot(path) => docs
                .into_iter()
                .map(|doc| replace_root(doc, path))
                .collect::<StorageResult<_>>()?,
            Stage::Skip(n) => docs.into_iter().skip(to_usize(*n)).collect(),
            Stage::Limit(n) => docs.into_iter().take(to_usize(*n)).collect(),
        };
    }
    Ok(docs)
}

/// One document per element of the array at `path`. Missing or null
/// values drop the document; a non-array value is kept as a single element.
fn unwind(doc: Value, path: &str) -> Vec<Value> {
    let items = match get_path(&doc, path) {
        Some(Value::Array(items)) => items.clone(),
        None | Some(Value::Null) => return Vec::new(),
        Some(_) => return vec![doc],
    };
    items
        .into_iter()
        .map(|item| {
            let mut copy = doc.clone();
            set_path(&mut copy, path, item);
            copy
        })
        .collect()
}

fn project(doc: &Value, projections: &[Projection]) -> Value {
    let mut out = Map::new();
    for Projection { name, expr } in projections {
        let value = match expr {
            ProjectExpr::Path(path) => get_path(doc, path).cloned(),
            ProjectExpr::FilterArray { input, cond } => match get_path(doc, input) {
                Some(Value::Array(items)) => {
                    let kept = items.iter().filter(|item| cond.matches(item));
                    Some(kept.cloned().collect())
                }
                _ => Some(Value::Null),
            },
            ProjectExpr::Size(path) => match get_path(doc, path) {
                Some(Value::Array(items)) => Some(Value::from(items.len())),
                _ => Some(Value::Null),
            },
        };
        if let Some(value) = value {
            out.insert(name.clone(), value);
        }
    }
    Value::Object(out)
}

fn replace_root(doc: Value, path: &str) -> StorageResult<Value> {
    match get_path(&doc, path) {
        Some(root @ Value::Object(_)) => Ok(root.clone()),
        other => Err(StorageError::InvalidPipeline(format!(
            "new root at `{path}` must be an object, found {}",
            other.map_or("nothing".to_string(), |v| JsonKind::of(v).to_string())
        ))),
    }
}

/// Plain dotted lookup through objects.
pub(crate) fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |value, segment| value.get(segment))
}

fn set_path(doc: &mut Value, path: &str, new_value: Value) {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), new_value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
