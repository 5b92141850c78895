//! Identifier stamping for nested collection members.

use nestdoc_types::{ObjectId, is_object_array};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ObjectId;
}

/// Time-prefixed random ids; the production generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> ObjectId {
        ObjectId::new()
    }
}

/// Deterministic ids `000…001`, `000…002`, … for tests and fixtures.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> ObjectId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let mut bytes = [0u8; 12];
        bytes[4..].copy_from_slice(&n.to_be_bytes());
        ObjectId::from_bytes(bytes)
    }
}

/// Ensures every member of every array-of-objects carries an id.
///
/// Objects reached through plain (non-array) fields are left alone; only
/// array members are collection entities.
#[derive(Debug)]
pub struct IdentityAssigner<G = RandomIds> {
    id_field: String,
    generator: G,
}

impl IdentityAssigner<RandomIds> {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self::with_generator(id_field, RandomIds)
    }
}

impl<G: IdGenerator> IdentityAssigner<G> {
    pub fn with_generator(id_field: impl Into<String>, generator: G) -> Self {
        Self {
            id_field: id_field.into(),
            generator,
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Stamps ids below `node`.
    ///
    /// - An array of objects: each member gets a fresh id unless it already
    ///   has one, then its own nested collections are stamped. A supplied id
    ///   that is valid hex is rewritten in lowercase so paths can match it.
    /// - A single object: its id is set to `addressed` when given (the id
    ///   decoded from the path), otherwise stamped if absent; then its
    ///   nested collections are stamped.
    pub fn assign_ids(&self, node: &mut Value, addressed: Option<ObjectId>) {
        if is_object_array(node) {
            self.stamp_members(node);
        } else if let Value::Object(map) = node {
            self.stamp(map, addressed);
        }
    }

    fn stamp(&self, entity: &mut Map<String, Value>, forced: Option<ObjectId>) {
        match (forced, entity.get_mut(&self.id_field)) {
            (Some(id), _) => {
                entity.insert(self.id_field.clone(), id.into());
            }
            (None, None) => {
                entity.insert(self.id_field.clone(), self.generator.next_id().into());
            }
            (None, Some(Value::String(raw))) => {
                if let Ok(id) = ObjectId::parse(raw) {
                    *raw = id.to_hex();
                }
            }
            (None, Some(_)) => {}
        }
        for child in entity.values_mut() {
            if is_object_array(child) {
                self.stamp_members(child);
            }
        }
    }

    fn stamp_members(&self, array: &mut Value) {
        if let Value::Array(items) = array {
            for item in items {
                if let Value::Object(member) = item {
                    self.stamp(member, None);
                }
            }
        }
    }
}
