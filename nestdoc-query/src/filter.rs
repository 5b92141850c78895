//! Exact-match filters and the literal coercion policy.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Converts a raw textual literal into the JSON value it is compared as.
///
/// This is the one coercion policy for filter and merge literals:
/// text that, once trimmed, parses completely as an integer becomes an
/// integer; otherwise text that parses as a finite float becomes a float;
/// anything else stays the given string, untouched.
///
/// The rule is lossy for fields that hold numeric-looking strings
/// (`"007"` is compared as `7`). That is the observed behavior and is kept.
pub fn coerce_literal(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(raw.to_string());
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => Value::String(raw.to_string()),
    }
}

/// A filter expression evaluated against one JSON document or element.
///
/// Field references are dotted paths; a path crossing an array matches if
/// any element matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Eq { field: String, value: Value },
    Exists { field: String },
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
        }
    }

    /// Conjunction; flattens nested conjunctions.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut clauses = Vec::new();
        for filter in filters {
            match filter {
                Self::And(inner) => clauses.extend(inner),
                other => clauses.push(other),
            }
        }
        Self::And(clauses)
    }

    /// Whether `doc` satisfies the filter. An empty conjunction matches all.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::Eq { field, value } => field_values(doc, field)
                .into_iter()
                .any(|found| values_equal(found, value) || contains_equal(found, value)),
            Self::Exists { field } => !field_values(doc, field).is_empty(),
            Self::And(clauses) => clauses.iter().all(|c| c.matches(doc)),
        }
    }

    /// The same filter with every field reference prefixed by `prefix.`.
    pub fn qualified(&self, prefix: &str) -> Self {
        match self {
            Self::Eq { field, value } => Self::eq(format!("{prefix}.{field}"), value.clone()),
            Self::Exists { field } => Self::exists(format!("{prefix}.{field}")),
            Self::And(clauses) => Self::And(clauses.iter().map(|c| c.qualified(prefix)).collect()),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq {
                field,
                value: Value::String(s),
            } => write!(f, "{field}=={s}"),
            Self::Eq { field, value } => write!(f, "{field}=={value}"),
            Self::Exists { field } => write!(f, "{field} exists"),
            Self::And(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "{clause}")?;
                }
                Ok(())
            }
        }
    }
}

/// Compiles flat `field → literal` maps into exact-match conjunctions.
///
/// Shared by filtered reads and delete-by-query.
pub struct FieldFilterCompiler;

impl FieldFilterCompiler {
    /// One equality clause per pair, in input order, each literal coerced
    /// through [`coerce_literal`].
    pub fn compile<I, K, V>(fields: I) -> Filter
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let clauses = fields
            .into_iter()
            .map(|(field, literal)| Filter::eq(field, coerce_literal(literal.as_ref())))
            .collect();
        Filter::And(clauses)
    }
}

/// Every value reachable from `doc` along the dotted `path`, fanning out
/// across arrays on the way.
pub fn field_values<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            collect_field(value, segment, &mut next);
        }
        current = next;
    }
    current
}

fn collect_field<'a>(value: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(segment) {
                out.push(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_field(item, segment, out);
            }
        }
        _ => {}
    }
}

/// Whether `found` is an array holding an element equal to `value`.
fn contains_equal(found: &Value, value: &Value) -> bool {
    matches!(found, Value::Array(items) if items.iter().any(|item| values_equal(item, value)))
}

/// JSON equality with numbers compared by value, so `20` equals `20.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}
