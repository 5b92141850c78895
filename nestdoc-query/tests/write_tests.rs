use nestdoc_query::{
    AliasStrategy, ArrayFilter, CompileError, CompilerConfig, Filter, Level, PathAddress,
    SequentialIds, SetClause, UpdateOp, WriteIntent, WriteQueryCompiler,
};
use nestdoc_types::ObjectId;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

const U1: &str = "5f1a2b3c4d5e6f7a8b9c0d1e";
const P1: &str = "6a0b1c2d3e4f5a6b7c8d9e0f";

fn compiler() -> WriteQueryCompiler<SequentialIds> {
    WriteQueryCompiler::with_generator(CompilerConfig::default(), SequentialIds::new())
}

fn path(segments: &[&str]) -> PathAddress {
    PathAddress::parse(segments).unwrap()
}

fn oid(hex: &str) -> ObjectId {
    ObjectId::parse(hex).unwrap()
}

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// ── Selector ─────────────────────────────────────────────────────

#[test]
fn selector_and_filters_for_nested_document() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1, "posts", P1]),
            WriteIntent::ReplaceDocument {
                document: json!({"title": "t"}),
            },
        )
        .unwrap();

    assert_eq!(
        query.selector.to_string(),
        "environments.$[envId].dev.users.$[usersId].posts.$[postsId]"
    );
    assert_eq!(
        query.array_filters,
        vec![
            ArrayFilter::new("envId", Filter::exists("dev")),
            ArrayFilter::new("usersId", Filter::eq("_id", oid(U1))),
            ArrayFilter::new("postsId", Filter::eq("_id", oid(P1))),
        ]
    );
    let rendered: Vec<String> = query
        .array_filters
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        rendered,
        vec![
            "envId.dev exists".to_string(),
            format!("usersId._id=={U1}"),
            format!("postsId._id=={P1}"),
        ]
    );
}

#[test]
fn target_matches_tenant_and_environment() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users"]),
            WriteIntent::AppendItems { items: vec![] },
        )
        .unwrap();
    assert_eq!(
        query.target,
        Filter::And(vec![
            Filter::eq("username", "alice"),
            Filter::exists("environments.dev"),
        ])
    );
}

#[test]
fn depth_aliases_allow_repeated_names() {
    let config = CompilerConfig {
        alias_strategy: AliasStrategy::Depth,
        ..Default::default()
    };
    let compiler = WriteQueryCompiler::with_generator(config, SequentialIds::new());
    let query = compiler
        .compile(
            "alice",
            "dev",
            &path(&["nodes", U1, "nodes", P1]),
            WriteIntent::DeleteMatching { fields: vec![] },
        )
        .unwrap();
    assert_eq!(
        query.selector.to_string(),
        "environments.$[envId].dev.nodes.$[d0Id].nodes"
    );
}

#[test]
fn repeated_names_are_ambiguous_with_collection_aliases() {
    let err = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["nodes", U1, "nodes", P1, "leaves"]),
            WriteIntent::AppendItems { items: vec![] },
        )
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::AmbiguousAlias {
            alias: "nodesId".into()
        }
    );
}

// ── Intents ──────────────────────────────────────────────────────

#[test]
fn replace_collection_sets_stamped_array() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users"]),
            WriteIntent::ReplaceCollection {
                items: vec![json!({"name": "A"})],
            },
        )
        .unwrap();
    let UpdateOp::Set(clauses) = &query.update else {
        panic!("expected set, got {:?}", query.update);
    };
    assert_eq!(clauses.len(), 1);
    assert_eq!(
        clauses[0].selector.to_string(),
        "environments.$[envId].dev.users"
    );
    assert!(clauses[0].value[0]["_id"].is_string());
    assert_eq!(query.array_filters.len(), 1);
}

#[test]
fn append_pushes_each_with_distinct_ids() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1, "posts"]),
            WriteIntent::AppendItems {
                items: vec![json!({"name": "A"}), json!({"name": "B"})],
            },
        )
        .unwrap();
    let UpdateOp::PushEach { selector, items } = &query.update else {
        panic!("expected push, got {:?}", query.update);
    };
    assert_eq!(
        selector.to_string(),
        "environments.$[envId].dev.users.$[usersId].posts"
    );
    assert_eq!(items.len(), 2);
    assert_ne!(items[0]["_id"], items[1]["_id"]);
}

#[test]
fn append_rejects_scalar_items() {
    let err = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users"]),
            WriteIntent::AppendItems {
                items: vec![json!({"a": 1}), json!(2)],
            },
        )
        .unwrap_err();
    assert!(matches!(err, CompileError::NotAnObject { .. }));
}

#[test]
fn replace_document_forces_path_id() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1]),
            WriteIntent::ReplaceDocument {
                document: json!({"_id": P1, "name": "A"}),
            },
        )
        .unwrap();
    let UpdateOp::Set(clauses) = query.update else {
        panic!("expected set");
    };
    assert_eq!(clauses[0].value["_id"], json!(U1));
}

#[test]
fn delete_document_pulls_from_parent_by_id() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1, "posts", P1]),
            WriteIntent::DeleteMatching { fields: vec![] },
        )
        .unwrap();
    assert_eq!(
        query.update,
        UpdateOp::Pull {
            selector: query.selector.clone(),
            filter: Filter::eq("_id", oid(P1)),
        }
    );
    assert_eq!(
        query.selector.to_string(),
        "environments.$[envId].dev.users.$[usersId].posts"
    );
    assert_eq!(query.array_filters.len(), 2);
}

#[test]
fn delete_by_query_pulls_matching_fields() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users"]),
            WriteIntent::DeleteMatching {
                fields: vec![("age".into(), "20".into())],
            },
        )
        .unwrap();
    assert_eq!(
        query.update,
        UpdateOp::Pull {
            selector: query.selector.clone(),
            filter: Filter::And(vec![Filter::eq("age", 20)]),
        }
    );
}

#[test]
fn merge_sets_one_clause_per_leaf() {
    let query = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1]),
            WriteIntent::MergeFields {
                fields: fields(json!({"age": "21", "address": {"city": "Oslo"}, "vip": true})),
            },
        )
        .unwrap();
    let UpdateOp::Set(clauses) = query.update else {
        panic!("expected set");
    };
    let rendered: Vec<(String, Value)> = clauses
        .into_iter()
        .map(|SetClause { selector, value }| (selector.to_string(), value))
        .collect();
    assert_eq!(
        rendered,
        vec![
            ("environments.$[envId].dev.users.$[usersId].age".to_string(), json!(21)),
            (
                "environments.$[envId].dev.users.$[usersId].address.city".to_string(),
                json!("Oslo")
            ),
            ("environments.$[envId].dev.users.$[usersId].vip".to_string(), json!(true)),
        ]
    );
}

#[test]
fn merge_cannot_touch_id() {
    let err = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1]),
            WriteIntent::MergeFields {
                fields: fields(json!({"_id": P1})),
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::ImmutableField {
            field: "_id".into()
        }
    );
}

#[test]
fn empty_merge_is_rejected() {
    let err = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1]),
            WriteIntent::MergeFields { fields: Map::new() },
        )
        .unwrap_err();
    assert_eq!(err, CompileError::EmptyMerge);
}

// ── Arity ────────────────────────────────────────────────────────

#[test]
fn collection_intents_reject_document_paths() {
    let err = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users", U1]),
            WriteIntent::AppendItems { items: vec![] },
        )
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::WrongLevel {
            operation: "append items",
            expected: Level::Collection
        }
    );
}

#[test]
fn document_intents_reject_collection_paths() {
    let err = compiler()
        .compile(
            "alice",
            "dev",
            &path(&["users"]),
            WriteIntent::ReplaceDocument {
                document: json!({}),
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::WrongLevel {
            operation: "replace document",
            expected: Level::Document
        }
    );
}
