//! # Validate Subcommand
//!
//! Compiles one schema and validates instance files against it, printing
//! violations either as indented text or as JSON.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use avram_schema::{ValidationResult, Violation};

/// Arguments for the `avram validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file (JSON or YAML).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Instance files (JSON or YAML).
    #[arg(value_name = "INSTANCE", required = true)]
    pub instances: Vec<PathBuf>,

    /// Print results as a JSON array.
    #[arg(long)]
    pub json: bool,

    /// Treat `format` as an annotation instead of an assertion.
    #[arg(long)]
    pub no_formats: bool,
}

/// Result of one instance file, as printed by `--json`.
#[derive(Debug, Serialize)]
pub struct InstanceReport {
    pub instance: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Execute the validate subcommand.
///
/// A schema that does not compile is an operational error: nothing can be
/// validated against it.
pub fn run_validate(args: &ValidateArgs, max_depth: Option<usize>) -> Result<u8> {
    let document = crate::load(&args.schema)?;
    let schema = crate::compiler(max_depth, !args.no_formats)
        .compile(&document)
        .with_context(|| format!("failed to compile {}", args.schema.display()))?;
    tracing::info!(
        schema = %args.schema.display(),
        nodes = schema.node_count(),
        "compiled schema"
    );

    let mut reports = Vec::with_capacity(args.instances.len());
    for path in &args.instances {
        let instance = crate::load(path)?;
        let result = schema.validate(&instance);
        tracing::debug!(instance = %path.display(), valid = result.valid, "validated instance");
        reports.push(InstanceReport {
            instance: path.display().to_string(),
            result,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", render_reports(&reports));
    }

    let failed = reports.iter().any(|report| !report.result.valid);
    Ok(crate::exit_code(failed))
}

/// Render reports as text, one status line per instance followed by its
/// violations. Branch causes are indented below the violation they explain.
pub fn render_reports(reports: &[InstanceReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let status = if report.result.valid { "valid" } else { "invalid" };
        let _ = writeln!(out, "{}: {status}", report.instance);
        for violation in report.result.violations() {
            render_violation(&mut out, violation, 0);
        }
    }
    out
}

fn render_violation(out: &mut String, violation: &Violation, depth: usize) {
    let _ = writeln!(out, "{:indent$}{violation}", "", indent = depth * 2);
    for cause in &violation.causes {
        render_violation(out, cause, depth + 1);
    }
}
