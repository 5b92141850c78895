//! Store-native identifiers.
//!
//! An [`ObjectId`] is 12 bytes: a 4-byte big-endian Unix timestamp (seconds)
//! followed by 8 random bytes. Its text form is exactly 24 hex characters,
//! which is also how it is stored inside entity JSON under `_id`.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of an id in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// Unique identifier for an element of a nested collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Creates a new id stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp();
        let seconds = now.clamp(0, i64::from(u32::MAX)) as u32;
        let random = Uuid::new_v4();

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[..8]);
        Self(bytes)
    }

    /// Creates an id from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Returns the creation time embedded in the first four bytes.
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Parses an id from its 24-character hex form.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(Error::InvalidObjectId(s.to_string()));
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::InvalidObjectId(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Returns the lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_hex()
    }
}

impl From<ObjectId> for serde_json::Value {
    fn from(id: ObjectId) -> Self {
        serde_json::Value::String(id.to_hex())
    }
}
