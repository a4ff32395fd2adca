//! # avram CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use avram_cli::check::{run_check, CheckArgs};
use avram_cli::compile::{run_compile, CompileArgs};
use avram_cli::validate::{run_validate, ValidateArgs};
use avram_cli::EXIT_ERROR;

/// Avram schema toolkit.
///
/// Compiles JSON-Schema draft-06 documents, validates instances against
/// them, and checks the Avram fixture corpus.
#[derive(Parser, Debug)]
#[command(name = "avram", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum instance nesting depth before validation stops descending.
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_depth: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check schema fixtures, test cases, and instance suites of a corpus.
    Check(CheckArgs),

    /// Compile schema files and report meta-schema violations.
    Compile(CompileArgs),

    /// Validate instance files against a schema.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let max_depth = cli
        .max_depth
        .map(|depth| usize::try_from(depth).unwrap_or(usize::MAX));

    let result = match cli.command {
        Commands::Check(args) => run_check(&args, max_depth),
        Commands::Compile(args) => run_compile(&args, max_depth),
        Commands::Validate(args) => run_validate(&args, max_depth),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
