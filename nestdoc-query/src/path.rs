//! Path addressing.
//!
//! A path alternates collection names (even indices) and ids (odd indices).
//! Odd length addresses a collection, even length one of its members.

use crate::PathError;
use nestdoc_types::ObjectId;
use std::fmt;

/// One `(collection, id?)` pair. Only the last step of a path may lack an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub name: String,
    pub id: Option<ObjectId>,
}

/// A validated path below the tenant/environment prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAddress {
    steps: Vec<PathStep>,
}

impl PathAddress {
    /// Validates raw segments.
    ///
    /// Every odd-indexed segment must decode as an [`ObjectId`]; the error
    /// cites the offending raw segment.
    pub fn parse<S: AsRef<str>>(segments: &[S]) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        let mut steps: Vec<PathStep> = Vec::with_capacity(segments.len().div_ceil(2));
        for (index, segment) in segments.iter().enumerate() {
            let segment = segment.as_ref();
            if index % 2 == 0 {
                if segment.is_empty() {
                    return Err(PathError::EmptyName { index });
                }
                steps.push(PathStep {
                    name: segment.to_string(),
                    id: None,
                });
            } else {
                let id = ObjectId::parse(segment).map_err(|_| PathError::InvalidId {
                    segment: segment.to_string(),
                    index,
                })?;
                if let Some(step) = steps.last_mut() {
                    step.id = Some(id);
                }
            }
        }
        Ok(Self { steps })
    }

    /// Parses `users/<id>/posts`, ignoring empty pieces around slashes.
    pub fn from_path_str(path: &str) -> Result<Self, PathError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        Self::parse(&segments)
    }

    /// Number of raw segments.
    pub fn len(&self) -> usize {
        let ids = self.steps.iter().filter(|s| s.id.is_some()).count();
        self.steps.len() + ids
    }

    /// Always `false`; a parsed path has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Odd length: the path ends on a collection name.
    pub fn is_collection_level(&self) -> bool {
        self.len() % 2 == 1
    }

    /// Even length: the path ends on an id.
    pub fn is_document_level(&self) -> bool {
        self.len() >= 2 && self.len() % 2 == 0
    }

    /// The last collection name.
    pub fn terminal_name(&self) -> &str {
        self.steps.last().map_or("", |s| s.name.as_str())
    }

    /// The addressed id at document level.
    pub fn terminal_id(&self) -> Option<ObjectId> {
        self.steps.last().and_then(|s| s.id)
    }

    /// The first (top-level) collection name.
    pub fn root_name(&self) -> &str {
        self.steps.first().map_or("", |s| s.name.as_str())
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// The collection containing the addressed document; `None` at
    /// collection level.
    pub fn parent_collection(&self) -> Option<Self> {
        if !self.is_document_level() {
            return None;
        }
        let mut steps = self.steps.clone();
        if let Some(last) = steps.last_mut() {
            last.id = None;
        }
        Some(Self { steps })
    }

    /// The nested collection `name` below the addressed document; `None` at
    /// collection level.
    pub fn child(&self, name: impl Into<String>) -> Option<Self> {
        if !self.is_document_level() {
            return None;
        }
        let mut steps = self.steps.clone();
        steps.push(PathStep {
            name: name.into(),
            id: None,
        });
        Some(Self { steps })
    }

    /// Collection names from the top level down to the terminal one.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }

    /// Slash-joined form without a leading slash.
    pub fn to_path_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&step.name)?;
            if let Some(id) = step.id {
                write!(f, "/{id}")?;
            }
        }
        Ok(())
    }
}
