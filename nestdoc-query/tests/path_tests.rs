use nestdoc_query::{PathAddress, PathError};
use nestdoc_types::ObjectId;

const U1: &str = "5f1a2b3c4d5e6f7a8b9c0d1e";
const P1: &str = "6a0b1c2d3e4f5a6b7c8d9e0f";

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn single_collection() {
    let path = PathAddress::parse(&["users"]).unwrap();
    assert_eq!(path.len(), 1);
    assert!(path.is_collection_level());
    assert!(!path.is_document_level());
    assert_eq!(path.terminal_name(), "users");
    assert_eq!(path.terminal_id(), None);
}

#[test]
fn document_level() {
    let path = PathAddress::parse(&["users", U1]).unwrap();
    assert!(path.is_document_level());
    assert!(!path.is_collection_level());
    assert_eq!(path.terminal_name(), "users");
    assert_eq!(path.terminal_id(), Some(ObjectId::parse(U1).unwrap()));
}

#[test]
fn nested_collection_level() {
    let path = PathAddress::parse(&["users", U1, "posts"]).unwrap();
    assert_eq!(path.len(), 3);
    assert!(path.is_collection_level());
    assert_eq!(path.terminal_name(), "posts");
    assert_eq!(path.root_name(), "users");
    let names: Vec<&str> = path.collection_names().collect();
    assert_eq!(names, vec!["users", "posts"]);
}

#[test]
fn invalid_id_cites_raw_segment() {
    let err = PathAddress::parse(&["users", "U1"]).unwrap_err();
    assert_eq!(
        err,
        PathError::InvalidId {
            segment: "U1".into(),
            index: 1
        }
    );
    assert!(err.to_string().contains("\"U1\""));
}

#[test]
fn invalid_deep_id() {
    let err = PathAddress::parse(&["users", U1, "posts", "nope"]).unwrap_err();
    assert_eq!(
        err,
        PathError::InvalidId {
            segment: "nope".into(),
            index: 3
        }
    );
}

#[test]
fn empty_path_rejected() {
    let empty: [&str; 0] = [];
    assert_eq!(PathAddress::parse(&empty), Err(PathError::Empty));
}

#[test]
fn empty_name_rejected() {
    assert_eq!(
        PathAddress::parse(&["users", U1, ""]),
        Err(PathError::EmptyName { index: 2 })
    );
}

#[test]
fn from_path_str_ignores_extra_slashes() {
    let path = PathAddress::from_path_str(&format!("/users/{U1}//posts/")).unwrap();
    assert_eq!(path.to_path_string(), format!("users/{U1}/posts"));
}

#[test]
fn display_roundtrip() {
    let raw = format!("users/{U1}/posts/{P1}");
    let path = PathAddress::from_path_str(&raw).unwrap();
    assert_eq!(path.to_string(), raw);
}

#[test]
fn parent_collection_of_document() {
    let path = PathAddress::parse(&["users", U1, "posts", P1]).unwrap();
    let parent = path.parent_collection().unwrap();
    assert_eq!(parent.to_string(), format!("users/{U1}/posts"));
    assert!(parent.is_collection_level());
}

#[test]
fn parent_collection_of_collection_is_none() {
    let path = PathAddress::parse(&["users"]).unwrap();
    assert!(path.parent_collection().is_none());
}

// ── Derived paths ────────────────────────────────────────────────

#[test]
fn child_of_document_is_nested_collection() {
    let path = PathAddress::parse(&["users", U1]).unwrap();
    let child = path.child("posts").unwrap();
    assert!(child.is_collection_level());
    assert_eq!(child.to_path_string(), format!("users/{U1}/posts"));
    assert_eq!(child.parent_collection(), None);
}

#[test]
fn collection_has_no_child() {
    let path = PathAddress::parse(&["users"]).unwrap();
    assert_eq!(path.child("posts"), None);
}
