use crate::SchemaError;
use nestdoc_types::JsonKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Suffix marking a field as optional (`"string?"`).
const OPTIONAL_SUFFIX: char = '?';

/// The declared kind of a leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    /// Returns the tag name as written in schema documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Whether a runtime value of `kind` satisfies this declaration.
    ///
    /// `null` satisfies nothing.
    #[must_use]
    pub fn accepts(&self, kind: JsonKind) -> bool {
        matches!(
            (self, kind),
            (Self::String, JsonKind::String)
                | (Self::Number, JsonKind::Number)
                | (Self::Boolean, JsonKind::Boolean)
                | (Self::Object, JsonKind::Object)
                | (Self::Array, JsonKind::Array)
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            _ => Err(()),
        }
    }
}

/// A leaf declaration: a kind, optionally marked optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub kind: FieldKind,
    pub optional: bool,
}

impl TypeTag {
    /// A mandatory field of `kind`.
    #[must_use]
    pub const fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    /// An optional field of `kind`.
    #[must_use]
    pub const fn optional(kind: FieldKind) -> Self {
        Self {
            kind,
            optional: true,
        }
    }

    /// Parses `"number"` or `"number?"`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.strip_suffix(OPTIONAL_SUFFIX) {
            Some(base) => base.parse().ok().map(Self::optional),
            None => tag.parse().ok().map(Self::required),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "{}{}", self.kind, OPTIONAL_SUFFIX)
        } else {
            f.write_str(self.kind.as_str())
        }
    }
}

/// One field declaration in a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    /// A primitive (or opaque object/array) field.
    Field(TypeTag),
    /// A nested collection with its own schema. Never optional.
    Nested(Schema),
}

/// Ordered field declarations for the entities of one collection.
///
/// Declaration order is significant: validation walks fields in this order,
/// so the first offending declared field decides the reported error.
///
/// The JSON form is an object whose values are either type tag strings or
/// nested schema objects:
///
/// ```
/// use nestdoc_model::Schema;
/// use serde_json::json;
///
/// let schema = Schema::try_from(json!({
///     "name": "string",
///     "age": "number?",
///     "posts": { "title": "string" }
/// }))
/// .unwrap();
/// assert_eq!(schema.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Schema {
    fields: Vec<(String, SchemaNode)>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a leaf field, replacing an earlier declaration of the same name.
    #[must_use]
    pub fn with_field(self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.with_node(name.into(), SchemaNode::Field(tag))
    }

    /// Declares a nested collection.
    #[must_use]
    pub fn with_nested(self, name: impl Into<String>, schema: Schema) -> Self {
        self.with_node(name.into(), SchemaNode::Nested(schema))
    }

    fn with_node(mut self, name: String, node: SchemaNode) -> Self {
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = node,
            None => self.fields.push((name, node)),
        }
        self
    }

    /// Iterates declarations in order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Looks up one declaration.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, node)| node)
    }

    /// Returns `true` if `name` is declared.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the nested schema declared under `name`, if any.
    #[must_use]
    pub fn nested(&self, name: &str) -> Option<&Schema> {
        match self.get(name) {
            Some(SchemaNode::Nested(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Walks nested declarations along `names`.
    ///
    /// Returns `Ok(None)` when a declared name is a plain field (nothing is
    /// known below it) and an error naming the first undeclared segment.
    pub fn resolve<'a, I>(&self, names: I) -> Result<Option<&Schema>, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for name in names {
            match current.get(name) {
                Some(SchemaNode::Nested(nested)) => current = nested,
                Some(SchemaNode::Field(_)) => return Ok(None),
                None => return Err(name.to_string()),
            }
        }
        Ok(Some(current))
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn decode(value: &Map<String, Value>) -> Result<Self, SchemaError> {
        let mut fields = Vec::with_capacity(value.len());
        for (name, declaration) in value {
            let node = match declaration {
                Value::String(tag) => {
                    let tag = TypeTag::parse(tag).ok_or_else(|| SchemaError::InvalidTypeTag {
                        field: name.clone(),
                        tag: tag.clone(),
                    })?;
                    SchemaNode::Field(tag)
                }
                Value::Object(nested) => SchemaNode::Nested(Self::decode(nested)?),
                other => {
                    return Err(SchemaError::InvalidNode {
                        field: name.clone(),
                        found: JsonKind::of(other),
                    });
                }
            };
            fields.push((name.clone(), node));
        }
        Ok(Self { fields })
    }

    fn encode(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, node)| {
                let value = match node {
                    SchemaNode::Field(tag) => Value::String(tag.to_string()),
                    SchemaNode::Nested(schema) => Value::Object(schema.encode()),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

impl TryFrom<Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match &value {
            Value::Object(map) => Self::decode(map),
            other => Err(SchemaError::NotAnObject(JsonKind::of(other))),
        }
    }
}

impl From<Schema> for Value {
    fn from(schema: Schema) -> Self {
        Value::Object(schema.encode())
    }
}
