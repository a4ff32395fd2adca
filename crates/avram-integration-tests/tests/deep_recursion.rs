//! # Deep Instances
//!
//! Self-referential schemas validate deep finite instances up to the depth
//! cap and stop with `DepthExceeded` beyond it. The default cap must fit the
//! 2 MiB stack of an ordinary spawned thread, debug builds included.

use std::thread;

use avram_schema::{compile, Compiler, ViolationKind, DEFAULT_MAX_DEPTH};
use serde_json::{json, Value};

const DEFAULT_THREAD_STACK: usize = 2 << 20;

fn nested(depth: usize) -> Value {
    let mut value = json!({});
    for _ in 0..depth {
        value = json!({ "child": value });
    }
    value
}

fn on_stack<F: FnOnce() + Send + 'static>(stack_size: usize, f: F) {
    thread::Builder::new()
        .stack_size(stack_size)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

fn tree_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"child": {"$ref": "#"}},
        "additionalProperties": false
    })
}

#[test]
fn default_cap_fits_a_default_thread_stack() {
    on_stack(DEFAULT_THREAD_STACK, || {
        let schema = compile(&tree_schema()).unwrap();
        assert!(schema.is_valid(&nested(DEFAULT_MAX_DEPTH)));

        let result = schema.validate(&nested(DEFAULT_MAX_DEPTH + 10));
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::DepthExceeded);
        assert_eq!(
            result.violations[0].instance_path,
            "/child".repeat(DEFAULT_MAX_DEPTH + 1)
        );
    });
}

#[test]
fn combinators_on_the_recursive_path_fit_a_default_thread_stack() {
    on_stack(DEFAULT_THREAD_STACK, || {
        let schema = compile(&json!({
            "definitions": {
                "node": {
                    "anyOf": [
                        {"type": "null"},
                        {
                            "type": "object",
                            "properties": {"child": {"$ref": "#/definitions/node"}},
                            "not": {"required": ["forbidden"]}
                        }
                    ]
                }
            },
            "$ref": "#/definitions/node"
        }))
        .unwrap();
        assert!(schema.is_valid(&nested(DEFAULT_MAX_DEPTH)));
        assert!(!schema.is_valid(&nested(DEFAULT_MAX_DEPTH + 10)));
    });
}

#[test]
fn parsed_documents_validate_fully_under_the_default_cap() {
    let depth = 100;
    let text = format!("{}{{}}{}", "{\"child\":".repeat(depth), "}".repeat(depth));
    let instance: Value = serde_json::from_str(&text).unwrap();
    let schema = compile(&tree_schema()).unwrap();
    assert!(schema.validate(&instance).violations.is_empty());
}

#[test]
fn deep_arrays_hit_the_same_cap() {
    on_stack(DEFAULT_THREAD_STACK, || {
        let schema = compile(&json!({
            "definitions": {"list": {"type": "array", "items": {"$ref": "#/definitions/list"}}},
            "$ref": "#/definitions/list"
        }))
        .unwrap();
        let mut instance = json!([]);
        for _ in 0..DEFAULT_MAX_DEPTH + 5 {
            instance = json!([instance]);
        }
        let result = schema.validate(&instance);
        assert!(!result.valid);
        assert!(result
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::DepthExceeded));
    });
}

#[test]
fn raised_cap_reaches_deeper_on_a_larger_stack() {
    on_stack(256 << 20, || {
        let schema = Compiler::new().max_depth(1000).compile(&tree_schema()).unwrap();
        assert!(schema.is_valid(&nested(1000)));
        let result = schema.validate(&nested(1005));
        assert_eq!(result.violations[0].kind, ViolationKind::DepthExceeded);
    });
}
