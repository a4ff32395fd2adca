//! # CLI Flows
//!
//! The subcommand handlers against files on disk, including the shipped
//! Avram format.

use std::fs;
use std::path::PathBuf;

use avram_cli::compile::{run_compile, CompileArgs};
use avram_cli::validate::{run_validate, ValidateArgs};
use avram_cli::{EXIT_FAILED, EXIT_OK};

fn corpus_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates
    dir.pop(); // workspace root
    dir.join("corpus")
}

#[test]
fn shipped_format_schemas_compile() {
    let args = CompileArgs {
        schemas: vec![corpus_root().join("schema.yaml"), corpus_root().join("case.yaml")],
        no_formats: false,
    };
    assert_eq!(run_compile(&args, None).unwrap(), EXIT_OK);
}

#[test]
fn fixtures_validate_against_avram_format() {
    let fixtures = corpus_root().join("schema");
    let valid = ValidateArgs {
        schema: corpus_root().join("schema.yaml"),
        instances: vec![
            fixtures.join("valid-minimal.json"),
            fixtures.join("valid-marc-title.json"),
        ],
        json: false,
        no_formats: false,
    };
    assert_eq!(run_validate(&valid, None).unwrap(), EXIT_OK);

    let invalid = ValidateArgs {
        schema: corpus_root().join("schema.yaml"),
        instances: vec![fixtures.join("invalid-subfield-code.json")],
        json: true,
        no_formats: false,
    };
    assert_eq!(run_validate(&invalid, None).unwrap(), EXIT_FAILED);
}

#[test]
fn depth_override_reaches_the_validator() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema.json");
    let instance = dir.path().join("instance.json");
    fs::write(&schema, r##"{"items": {"$ref": "#"}}"##).unwrap();
    fs::write(&instance, "[[[[[[]]]]]]").unwrap();

    let args = ValidateArgs {
        schema,
        instances: vec![instance],
        json: false,
        no_formats: false,
    };
    assert_eq!(run_validate(&args, None).unwrap(), EXIT_OK);
    assert_eq!(run_validate(&args, Some(3)).unwrap(), EXIT_FAILED);
}
