//! # avram-cli: Command-Line Interface
//!
//! Provides the `avram` binary.
//!
//! ## Subcommands
//!
//! - `avram check`: run the fixture corpus through the harness.
//! - `avram compile`: compile schema files and report meta-schema errors.
//! - `avram validate`: validate instance files against one schema.
//!
//! ```bash
//! avram check --root corpus
//! avram compile corpus/schema.yaml
//! avram validate corpus/schema.yaml corpus/schema/valid-minimal.json --json
//! ```
//!
//! Every handler returns the process exit code: `0` on success, `1` when a
//! check or validation failed. Operational errors surface as `Err` and are
//! mapped to `2` by the binary.

pub mod check;
pub mod compile;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use avram_schema::Compiler;

/// Exit code for a run where every check passed.
pub const EXIT_OK: u8 = 0;
/// Exit code for a run where at least one check or instance failed.
pub const EXIT_FAILED: u8 = 1;
/// Exit code for operational errors (unreadable files, bad configuration).
pub const EXIT_ERROR: u8 = 2;

/// Build a compiler honoring the global `--max-depth` override.
pub fn compiler(max_depth: Option<usize>, validate_formats: bool) -> Compiler {
    let compiler = Compiler::new().validate_formats(validate_formats);
    match max_depth {
        Some(depth) => compiler.max_depth(depth),
        None => compiler,
    }
}

/// Load a JSON or YAML document, attaching the path to any error.
pub fn load(path: &Path) -> Result<Value> {
    avram_corpus::load_document(path).with_context(|| format!("failed to load {}", path.display()))
}

fn exit_code(failed: bool) -> u8 {
    if failed {
        EXIT_FAILED
    } else {
        EXIT_OK
    }
}
