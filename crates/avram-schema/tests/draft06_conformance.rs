//! Draft-06 conformance checks against the public API.
//!
//! Each table entry is a schema with instances and their expected outcome.
//! Outcomes are also cross-checked against the `jsonschema` crate in draft-6
//! mode, restricted to keywords both engines treat identically (no `format`,
//! no `if`/`then`/`else`).

use avram_schema::{compile, meta, CompileError, ViolationKind};
use serde_json::{json, Value};

struct Case {
    name: &'static str,
    schema: Value,
    instances: Vec<(Value, bool)>,
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "type union",
            schema: json!({"type": ["string", "null"]}),
            instances: vec![(json!("a"), true), (json!(null), true), (json!(1), false)],
        },
        Case {
            name: "integer accepts integral floats",
            schema: json!({"type": "integer"}),
            instances: vec![(json!(1), true), (json!(1.5), false), (json!("1"), false)],
        },
        Case {
            name: "enum with structural equality",
            schema: json!({"enum": [{"a": [1, 2]}, "x"]}),
            instances: vec![(json!({"a": [1, 2]}), true), (json!("x"), true), (json!({"a": [2, 1]}), false)],
        },
        Case {
            name: "const",
            schema: json!({"const": {"tag": "245"}}),
            instances: vec![(json!({"tag": "245"}), true), (json!({"tag": "246"}), false)],
        },
        Case {
            name: "properties with additionalProperties false",
            schema: json!({"properties": {"a": {}}, "additionalProperties": false}),
            instances: vec![(json!({"a": 1}), true), (json!({"a": 1, "b": 2}), false), (json!([1]), true)],
        },
        Case {
            name: "patternProperties",
            schema: json!({"patternProperties": {"^[0-9]{3}$": {"type": "object"}}, "additionalProperties": false}),
            instances: vec![(json!({"245": {}}), true), (json!({"245": 1}), false), (json!({"24": {}}), false)],
        },
        Case {
            name: "lookahead in pattern and patternProperties",
            schema: json!({
                "pattern": "^(?!x)",
                "patternProperties": {"^(?=[0-9])": {"type": "string"}}
            }),
            instances: vec![
                (json!("abc"), true),
                (json!("xyz"), false),
                (json!({"1a": "s"}), true),
                (json!({"1a": 1}), false),
                (json!({"a1": 1}), true),
            ],
        },
        Case {
            name: "required and property counts",
            schema: json!({"required": ["tag"], "minProperties": 1, "maxProperties": 2}),
            instances: vec![
                (json!({"tag": 1}), true),
                (json!({"tag": 1, "a": 2, "b": 3}), false),
                (json!({"a": 1}), false),
                (json!("not an object"), true),
            ],
        },
        Case {
            name: "propertyNames",
            schema: json!({"propertyNames": {"maxLength": 3}}),
            instances: vec![(json!({"abc": 1}), true), (json!({"abcd": 1}), false)],
        },
        Case {
            name: "dependencies",
            schema: json!({"dependencies": {"a": ["b"], "c": {"required": ["d"]}}}),
            instances: vec![
                (json!({"a": 1, "b": 2}), true),
                (json!({"a": 1}), false),
                (json!({"c": 1, "d": 2}), true),
                (json!({"c": 1}), false),
            ],
        },
        Case {
            name: "tuple items",
            schema: json!({"items": [{"type": "string"}, {"type": "integer"}], "additionalItems": false}),
            instances: vec![(json!(["a", 1]), true), (json!(["a"]), true), (json!(["a", 1, 2]), false), (json!([1]), false)],
        },
        Case {
            name: "array bounds, uniqueness and contains",
            schema: json!({"minItems": 1, "maxItems": 3, "uniqueItems": true, "contains": {"const": 0}}),
            instances: vec![
                (json!([0, 1]), true),
                (json!([]), false),
                (json!([0, 0]), false),
                (json!([1, 2]), false),
                (json!([0, 1, 2, 3]), false),
            ],
        },
        Case {
            name: "numeric bounds",
            schema: json!({"minimum": 1, "exclusiveMaximum": 10, "multipleOf": 0.5}),
            instances: vec![(json!(1), true), (json!(9.5), true), (json!(10), false), (json!(0.5), false), (json!(1.25), false)],
        },
        Case {
            name: "string bounds and pattern",
            schema: json!({"minLength": 1, "maxLength": 3, "pattern": "^[a-z]+$"}),
            instances: vec![(json!("abc"), true), (json!(""), false), (json!("abcd"), false), (json!("AB"), false)],
        },
        Case {
            name: "combinators",
            schema: json!({
                "allOf": [{"type": "integer"}],
                "anyOf": [{"minimum": 10}, {"maximum": 0}],
                "oneOf": [{"multipleOf": 2}, {"multipleOf": 3}],
                "not": {"const": 12}
            }),
            instances: vec![(json!(10), true), (json!(-3), true), (json!(12), false), (json!(5), false), (json!(18), false)],
        },
        Case {
            name: "recursive tree",
            schema: json!({
                "definitions": {
                    "node": {
                        "type": "object",
                        "required": ["value"],
                        "properties": {
                            "value": {"type": "integer"},
                            "children": {"type": "array", "items": {"$ref": "#/definitions/node"}}
                        }
                    }
                },
                "$ref": "#/definitions/node"
            }),
            instances: vec![
                (json!({"value": 1, "children": [{"value": 2, "children": [{"value": 3}]}]}), true),
                (json!({"value": 1, "children": [{"value": "2"}]}), false),
                (json!({"children": []}), false),
            ],
        },
        Case {
            name: "boolean subschemas",
            schema: json!({"properties": {"yes": true, "no": false}}),
            instances: vec![(json!({"yes": 1}), true), (json!({"no": 1}), false)],
        },
    ]
}

#[test]
fn table_outcomes_match_expectations() {
    for case in cases() {
        let compiled = compile(&case.schema).unwrap_or_else(|e| panic!("{}: {e}", case.name));
        for (instance, expected) in &case.instances {
            let result = compiled.validate(instance);
            assert_eq!(
                result.valid, *expected,
                "{}: instance {instance} expected valid={expected}, violations:\n{:#?}",
                case.name, result.violations
            );
            assert_eq!(result.valid, result.violations.is_empty());
        }
    }
}

#[test]
fn table_outcomes_agree_with_reference_engine() {
    for case in cases() {
        let ours = compile(&case.schema).unwrap();
        let reference = jsonschema::draft6::new(&case.schema)
            .unwrap_or_else(|e| panic!("{}: reference engine rejected schema: {e}", case.name));
        for (instance, _) in &case.instances {
            assert_eq!(
                ours.is_valid(instance),
                reference.is_valid(instance),
                "{}: engines disagree on {instance}",
                case.name
            );
        }
    }
}

#[test]
fn meta_schema_compiles_through_public_entry_point() {
    let document = meta::document().unwrap();
    let compiled = compile(&document).unwrap();
    assert!(compiled.is_valid(&json!({"type": "object", "properties": {"a": {"$ref": "#"}}})));
    assert!(!compiled.is_valid(&json!({"type": "object", "properties": {"a": 5}})));
}

#[test]
fn invalid_schema_violation_points_at_keyword() {
    let err = compile(&json!({"properties": {"tag": {"minItems": "three"}}})).unwrap_err();
    let violations = err.violations().expect("SchemaInvalid");
    assert!(!violations.is_empty());
    assert!(
        violations
            .violations()
            .iter()
            .any(|v| v.instance_path == "/properties/tag/minItems"),
        "{violations}"
    );
    assert!(err.to_string().starts_with("schema is not a valid draft-06 schema"));
}

#[test]
fn invalid_regex_is_rejected_by_meta_format() {
    let err = compile(&json!({"pattern": "(unclosed"})).unwrap_err();
    let violations = err.violations().expect("SchemaInvalid");
    assert_eq!(violations.violations()[0].kind, ViolationKind::Format);
    assert_eq!(violations.violations()[0].instance_path, "/pattern");
}

#[test]
fn errors_are_never_permissive() {
    for schema in [
        json!({"$ref": "#/definitions/nope"}),
        json!({"$ref": "https://example.org/remote.json"}),
        json!({"type": "text"}),
    ] {
        match compile(&schema) {
            Err(CompileError::UnresolvedRef { .. })
            | Err(CompileError::UnsupportedConstruct { .. })
            | Err(CompileError::SchemaInvalid(_)) => {}
            other => panic!("expected a compile error for {schema}, got {other:?}"),
        }
    }
}

#[test]
fn violations_serialize_to_json() {
    let compiled = compile(&json!({"anyOf": [{"type": "string"}, {"type": "null"}]})).unwrap();
    let result = compiled.validate(&json!(1));
    let rendered = serde_json::to_value(&result).unwrap();
    assert_eq!(rendered["valid"], json!(false));
    assert_eq!(rendered["violations"][0]["kind"], json!("anyOf"));
    assert_eq!(rendered["violations"][0]["instancePath"], json!(""));
    assert_eq!(rendered["violations"][0]["causes"][0]["schemaPath"], json!("/anyOf/0/type"));
}
