//! # Shared Schemas Across Threads
//!
//! A compiled schema is immutable and can be validated from many threads at
//! once. The schema cache compiles a document once and hands every caller
//! the same instance.

use std::sync::Arc;
use std::thread;

use avram_schema::{compile, SchemaCache, SchemaDigest};
use serde_json::json;

#[test]
fn one_schema_validates_on_many_threads() {
    let schema = compile(&json!({
        "type": "object",
        "properties": {"tag": {"type": "string", "pattern": "^[0-9]{3}$"}},
        "required": ["tag"]
    }))
    .unwrap();
    let expected_invalid = schema.validate(&json!({"tag": "24"}));

    thread::scope(|scope| {
        for worker in 0..8 {
            let schema = &schema;
            let expected_invalid = &expected_invalid;
            scope.spawn(move || {
                for i in 0..200 {
                    let tag = format!("{:03}", (worker * 200 + i) % 1000);
                    assert!(schema.is_valid(&json!({ "tag": tag })));
                    assert_eq!(&schema.validate(&json!({"tag": "24"})), expected_invalid);
                }
            });
        }
    });
}

#[test]
fn cache_compiles_each_document_once() {
    let cache = SchemaCache::default();
    let documents = [
        json!({"type": "string"}),
        json!({"type": "integer", "minimum": 0}),
        json!({"items": {"$ref": "#"}}),
    ];

    let handles: Vec<Vec<_>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..6)
            .map(|_| {
                scope.spawn(|| {
                    documents
                        .iter()
                        .map(|document| cache.get_or_compile(document).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(cache.len(), documents.len());
    for (i, document) in documents.iter().enumerate() {
        let cached = cache.get(&SchemaDigest::of(document).unwrap()).unwrap();
        for compiled in &handles {
            assert!(Arc::ptr_eq(&compiled[i], &cached));
        }
    }
}

#[test]
fn key_order_selects_distinct_cache_entries() {
    let cache = SchemaCache::default();
    let a: serde_json::Value =
        serde_json::from_str(r#"{"type": "string", "minLength": 1}"#).unwrap();
    let b: serde_json::Value =
        serde_json::from_str(r#"{"minLength": 1, "type": "string"}"#).unwrap();

    let first = cache.get_or_compile(&a).unwrap();
    let second = cache.get_or_compile(&b).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &cache.get_or_compile(&b).unwrap()));
    assert_eq!(cache.len(), 2);

    let schema_paths: Vec<String> = second
        .validate(&serde_json::json!(""))
        .violations
        .into_iter()
        .map(|v| v.schema_path)
        .collect();
    assert_eq!(schema_paths, ["/minLength"]);
}
