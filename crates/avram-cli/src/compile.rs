//! # Compile Subcommand
//!
//! Compiles schema files and reports every meta-schema violation of the ones
//! that are not valid draft-06.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

/// Arguments for the `avram compile` subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Schema files (JSON or YAML).
    #[arg(value_name = "SCHEMA", required = true)]
    pub schemas: Vec<PathBuf>,

    /// Treat `format` as an annotation instead of an assertion.
    #[arg(long)]
    pub no_formats: bool,
}

/// Execute the compile subcommand.
///
/// Unreadable files abort the run. Schemas that do not compile are reported
/// and counted.
pub fn run_compile(args: &CompileArgs, max_depth: Option<usize>) -> Result<u8> {
    let compiler = crate::compiler(max_depth, !args.no_formats);
    let mut failed = 0usize;

    for path in &args.schemas {
        let document = crate::load(path)?;
        match compiler.compile(&document) {
            Ok(schema) => {
                tracing::info!(path = %path.display(), nodes = schema.node_count(), "compiled schema");
                println!("{}: OK", path.display());
            }
            Err(e) => {
                failed += 1;
                println!("{}: FAIL", path.display());
                println!("  {e}");
            }
        }
    }

    if failed > 0 {
        println!(
            "\n{failed} schema(s) failed to compile out of {} total.",
            args.schemas.len()
        );
    }
    Ok(crate::exit_code(failed > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn valid_schemas_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("a.json");
        let yaml = dir.path().join("b.yaml");
        fs::write(&json, r#"{"type": "string", "minLength": 1}"#).unwrap();
        fs::write(&yaml, "properties:\n  tag: {$ref: \"#/definitions/tag\"}\ndefinitions:\n  tag: {type: string}\n").unwrap();

        let args = CompileArgs {
            schemas: vec![json, yaml],
            no_formats: false,
        };
        assert_eq!(run_compile(&args, None).unwrap(), crate::EXIT_OK);
    }

    #[test]
    fn invalid_schema_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, "{}").unwrap();
        fs::write(&bad, r#"{"minLength": -1}"#).unwrap();

        let args = CompileArgs {
            schemas: vec![good, bad],
            no_formats: false,
        };
        assert_eq!(run_compile(&args, None).unwrap(), crate::EXIT_FAILED);
    }

    #[test]
    fn unreadable_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CompileArgs {
            schemas: vec![dir.path().join("absent.json")],
            no_formats: true,
        };
        assert!(run_compile(&args, Some(32)).is_err());
    }
}
