//! Harness errors.
//!
//! [`CorpusError`] aborts a run: the corpus could not be read or the format
//! schemas could not be compiled. [`CheckFailure`] is the reason a single
//! fixture or test case did not pass; a run collects those into its report.

use std::path::PathBuf;

use avram_schema::{CompileError, ValidationViolations};
use thiserror::Error;

use crate::config::ConfigError;

/// Operational errors that stop the harness.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is not well-formed JSON or YAML.
    #[error("failed to parse {path}: {reason}")]
    Parse {
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The file extension is neither JSON nor YAML.
    #[error("unsupported document type: {path}")]
    UnsupportedExtension { path: PathBuf },

    /// A test-case file is not a YAML sequence.
    #[error("test set {path} must be a sequence of test cases")]
    NotASequence { path: PathBuf },

    /// The Avram format or test-case format does not compile.
    #[error("format schema {path} does not compile: {source}")]
    FormatSchema {
        path: PathBuf,
        #[source]
        source: CompileError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why a single corpus entry did not pass.
#[derive(Error, Debug)]
pub enum CheckFailure {
    /// A `valid*` fixture was rejected by the format schema.
    #[error("expected a valid Avram schema, found {} violation(s):\n{violations}", .violations.len())]
    Rejected { violations: ValidationViolations },

    /// An `invalid*` fixture was accepted by the format schema.
    #[error("expected an invalid Avram schema, but it was accepted")]
    Accepted,

    /// The entry does not have the shape of a test case.
    #[error("not a valid test case:\n{0}")]
    CaseShape(ValidationViolations),

    /// The case passed the test-case format but lacks fields the harness
    /// reads.
    #[error("test case fields are unreadable: {0}")]
    CaseFields(serde_json::Error),

    /// The test case's schema is not valid Avram.
    #[error("schema is not valid Avram:\n{0}")]
    NotAvram(ValidationViolations),

    /// The test case's schema does not compile as JSON Schema.
    #[error("schema does not compile: {0}")]
    Compile(#[from] CompileError),

    /// An embedded instance produced the wrong outcome.
    #[error(
        "instance {index} ({description}) expected {}, found {} violation(s):\n{violations}",
        expectation(.expected_valid),
        .violations.len()
    )]
    InstanceOutcome {
        /// 1-based position of the instance in the case.
        index: usize,
        description: String,
        expected_valid: bool,
        violations: ValidationViolations,
    },
}

fn expectation(valid: &bool) -> &'static str {
    if *valid {
        "valid"
    } else {
        "invalid"
    }
}
