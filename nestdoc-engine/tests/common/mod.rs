//! Shared fixtures for service tests.

#![allow(dead_code)]

use nestdoc_engine::{CollectionService, EngineConfig, ReadOutcome};
use nestdoc_query::SequentialIds;
use nestdoc_storage::MemoryStore;
use serde_json::{Value, json};
use std::sync::{Arc, Once};

pub const U1: &str = "5f1a2b3c4d5e6f7a8b9c0d1e";
pub const U2: &str = "5f1a2b3c4d5e6f7a8b9c0d2e";
pub const P1: &str = "6a0b1c2d3e4f5a6b7c8d9e01";
pub const P2: &str = "6a0b1c2d3e4f5a6b7c8d9e02";
pub const P3: &str = "6a0b1c2d3e4f5a6b7c8d9e03";
pub const MISSING: &str = "ffffffffffffffffffffffff";

pub const NO_PARAMS: &[(&str, &str)] = &[];

static TRACING: Once = Once::new();

/// Routes `tracing` output through the test harness. `RUST_LOG` applies.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Tenant `alice` with a `dev` environment holding two users, the first
/// with three posts, and an empty `prod` environment.
pub fn alice() -> Value {
    json!({
        "username": "alice",
        "environments": [
            {"dev": {"users": [
                {"_id": U1, "name": "ann", "age": 30, "tags": ["a", "b"], "posts": [
                    {"_id": P1, "title": "one"},
                    {"_id": P2, "title": "two"},
                    {"_id": P3, "title": "three"}
                ]},
                {"_id": U2, "name": "bob", "age": 20}
            ]}},
            {"prod": {}}
        ],
        "entitySchemas": {}
    })
}

pub type Service = CollectionService<SequentialIds>;

pub fn service_with(config: EngineConfig) -> (Arc<MemoryStore>, Service) {
    init_tracing();
    let store = MemoryStore::with_config(config.compiler.clone()).with_tenants([alice()]);
    let store = Arc::new(store);
    let service = CollectionService::with_generator(
        store.clone(),
        store.clone(),
        config,
        SequentialIds::new(),
    );
    (store, service)
}

pub fn service() -> (Arc<MemoryStore>, Service) {
    service_with(EngineConfig::default())
}

pub fn items(outcome: ReadOutcome) -> Vec<Value> {
    match outcome {
        ReadOutcome::Items(items) => items,
        other => panic!("expected items, got {other:?}"),
    }
}

/// Reads `path` in `alice/dev` and expects a member list.
pub async fn read_items(service: &Service, path: &str) -> Vec<Value> {
    let outcome = service.fetch("alice", "dev", path, NO_PARAMS).await;
    items(outcome.unwrap())
}

pub async fn read_document(service: &Service, path: &str) -> Value {
    let outcome = service.fetch("alice", "dev", path, NO_PARAMS).await;
    match outcome.unwrap() {
        ReadOutcome::Document(doc) => doc,
        other => panic!("expected a document, got {other:?}"),
    }
}

pub fn ids(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v["_id"].as_str().map(str::to_string))
        .collect()
}
