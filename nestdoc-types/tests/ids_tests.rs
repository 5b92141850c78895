use nestdoc_types::{JsonKind, ObjectId, is_object_array};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::str::FromStr;

// ── ObjectId ─────────────────────────────────────────────────────

#[test]
fn object_id_new_is_unique() {
    let a = ObjectId::new();
    let b = ObjectId::new();
    assert_ne!(a, b);
}

#[test]
fn object_id_many_are_unique() {
    let ids: HashSet<ObjectId> = (0..1000).map(|_| ObjectId::new()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn object_id_hex_is_24_lowercase_chars() {
    let hex = ObjectId::new().to_hex();
    assert_eq!(hex.len(), 24);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(hex, hex.to_ascii_lowercase());
}

#[test]
fn object_id_display_and_parse() {
    let id = ObjectId::new();
    let parsed = ObjectId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn object_id_from_str() {
    let id: ObjectId = ObjectId::from_str("5f1a2b3c4d5e6f7a8b9c0d1e").unwrap();
    assert_eq!(id.to_hex(), "5f1a2b3c4d5e6f7a8b9c0d1e");
}

#[test]
fn object_id_parse_accepts_uppercase() {
    let id = ObjectId::parse("5F1A2B3C4D5E6F7A8B9C0D1E").unwrap();
    assert_eq!(id.to_hex(), "5f1a2b3c4d5e6f7a8b9c0d1e");
}

#[test]
fn object_id_parse_rejects_wrong_length() {
    assert!(ObjectId::parse("5f1a2b").is_err());
    assert!(ObjectId::parse("5f1a2b3c4d5e6f7a8b9c0d1e00").is_err());
    assert!(ObjectId::parse("").is_err());
}

#[test]
fn object_id_parse_rejects_non_hex() {
    assert!(ObjectId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    assert!(ObjectId::parse("users-not-an-id-at-all!!").is_err());
}

#[test]
fn object_id_error_cites_segment() {
    let err = ObjectId::parse("U1").unwrap_err();
    assert!(err.to_string().contains("\"U1\""));
}

#[test]
fn object_id_timestamp_is_recent() {
    let id = ObjectId::new();
    let now = chrono::Utc::now().timestamp() as u32;
    assert!(now - id.timestamp() < 5);
}

#[test]
fn object_id_bytes_roundtrip() {
    let bytes = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
    let id = ObjectId::from_bytes(bytes);
    assert_eq!(id.bytes(), bytes);
    assert_eq!(id.to_hex(), "0102030405060708090a0b0c");
}

#[test]
fn object_id_serializes_as_hex_string() {
    let id = ObjectId::parse("5f1a2b3c4d5e6f7a8b9c0d1e").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"5f1a2b3c4d5e6f7a8b9c0d1e\"");
    let back: ObjectId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn object_id_deserialize_rejects_garbage() {
    assert!(serde_json::from_str::<ObjectId>("\"nope\"").is_err());
}

#[test]
fn object_id_into_json_value() {
    let id = ObjectId::parse("5f1a2b3c4d5e6f7a8b9c0d1e").unwrap();
    let value: serde_json::Value = id.into();
    assert_eq!(value, json!("5f1a2b3c4d5e6f7a8b9c0d1e"));
}

proptest! {
    #[test]
    fn object_id_parse_inverts_to_hex(bytes in any::<[u8; 12]>()) {
        let id = ObjectId::from_bytes(bytes);
        prop_assert_eq!(ObjectId::parse(&id.to_hex()).unwrap(), id);
    }
}

// ── JsonKind ─────────────────────────────────────────────────────

#[test]
fn json_kind_classifies_every_variant() {
    assert_eq!(JsonKind::of(&json!(null)), JsonKind::Null);
    assert_eq!(JsonKind::of(&json!(true)), JsonKind::Boolean);
    assert_eq!(JsonKind::of(&json!(1.5)), JsonKind::Number);
    assert_eq!(JsonKind::of(&json!("x")), JsonKind::String);
    assert_eq!(JsonKind::of(&json!([])), JsonKind::Array);
    assert_eq!(JsonKind::of(&json!({})), JsonKind::Object);
}

#[test]
fn json_kind_array_and_object_are_distinct() {
    assert_ne!(JsonKind::of(&json!([{}])), JsonKind::of(&json!({})));
}

#[test]
fn json_kind_display() {
    assert_eq!(JsonKind::Boolean.to_string(), "boolean");
    assert_eq!(JsonKind::Object.to_string(), "object");
}

#[test]
fn object_array_detection() {
    assert!(is_object_array(&json!([{"a": 1}, {"b": 2}])));
    assert!(!is_object_array(&json!([])));
    assert!(!is_object_array(&json!([1, 2])));
    assert!(!is_object_array(&json!([{"a": 1}, 2])));
    assert!(!is_object_array(&json!({"a": 1})));
}
