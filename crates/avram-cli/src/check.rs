//! # Check Subcommand
//!
//! Runs the fixture corpus: schema fixtures against the Avram format, Avram
//! test cases, and draft-06 instance suites.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use avram_corpus::{CorpusConfig, CorpusReport, CorpusSummary, Harness};

/// Arguments for the `avram check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Corpus root directory. Defaults to `$AVRAM_CORPUS_ROOT`, then `corpus`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, max_depth: Option<usize>) -> Result<u8> {
    let config = resolve_config(args, max_depth)?;
    tracing::debug!(root = %config.root.display(), max_depth = config.max_depth, "checking corpus");

    let harness = Harness::new(config).context("failed to load corpus formats")?;
    let summary = harness.run().context("failed to read corpus")?;

    print!("{}", render_summary(&summary));
    Ok(crate::exit_code(!summary.is_success()))
}

/// Environment configuration with command-line overrides applied.
fn resolve_config(args: &CheckArgs, max_depth: Option<usize>) -> Result<CorpusConfig> {
    let mut config = CorpusConfig::from_env().context("invalid corpus configuration")?;
    if let Some(root) = &args.root {
        config = CorpusConfig::from_root(root).with_max_depth(config.max_depth);
    }
    if let Some(depth) = max_depth {
        config = config.with_max_depth(depth);
    }
    Ok(config)
}

/// Render the per-section counts and failures.
pub fn render_summary(summary: &CorpusSummary) -> String {
    let mut out = String::new();
    section(&mut out, "Schemas", &summary.schemas);
    section(&mut out, "Cases", &summary.cases);
    section(&mut out, "Instances", &summary.instances);
    if summary.failed() > 0 {
        let _ = writeln!(
            out,
            "\n{} check(s) failed out of {} total.",
            summary.failed(),
            summary.total()
        );
    }
    out
}

fn section(out: &mut String, title: &str, report: &CorpusReport) {
    let _ = writeln!(out, "{title}: {}/{} passed", report.passed, report.total);
    for failure in &report.failures {
        let _ = writeln!(out, "  FAIL: {failure}");
    }
}
