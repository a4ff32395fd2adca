//! Corpus layout and harness configuration.
//!
//! A corpus root holds the Avram format schema (`schema.yaml`), the test-case
//! format (`case.yaml`), schema fixtures under `schema/`, Avram test cases
//! under `tests/` and draft-06 instance suites under `draft06/`. Defaults
//! can be overridden through environment variables or explicit construction.

use std::path::{Path, PathBuf};

use avram_schema::DEFAULT_MAX_DEPTH;

/// Environment variable naming the corpus root.
pub const ROOT_ENV: &str = "AVRAM_CORPUS_ROOT";
/// Environment variable overriding the validator depth cap.
pub const MAX_DEPTH_ENV: &str = "AVRAM_MAX_DEPTH";
/// Corpus root used when nothing else is configured.
pub const DEFAULT_ROOT: &str = "corpus";

/// Where the harness finds its inputs, and how deep it validates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    /// Corpus root directory.
    pub root: PathBuf,
    /// The Avram format, itself a draft-06 schema.
    pub format_schema: PathBuf,
    /// The test-case format.
    pub case_schema: PathBuf,
    /// Directory of `valid*`/`invalid*` schema fixtures.
    pub schema_fixtures: PathBuf,
    /// Directory of YAML test-case sets.
    pub test_cases: PathBuf,
    /// Directory of YAML instance suites. Optional on disk.
    pub instance_suites: PathBuf,
    /// Validator depth cap for every schema the harness compiles.
    pub max_depth: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self::from_root(DEFAULT_ROOT)
    }
}

impl CorpusConfig {
    /// Standard layout under `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            format_schema: root.join("schema.yaml"),
            case_schema: root.join("case.yaml"),
            schema_fixtures: root.join("schema"),
            test_cases: root.join("tests"),
            instance_suites: root.join("draft06"),
            max_depth: DEFAULT_MAX_DEPTH,
            root,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `AVRAM_CORPUS_ROOT` (default: `corpus`)
    /// - `AVRAM_MAX_DEPTH` (default: 128)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let root = lookup(ROOT_ENV).unwrap_or_else(|| DEFAULT_ROOT.to_string());
        if root.trim().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }
        let mut config = Self::from_root(root);
        if let Some(raw) = lookup(MAX_DEPTH_ENV) {
            config.max_depth = parse_depth(&raw)?;
        }
        Ok(config)
    }

    /// Override the validator depth cap.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

fn parse_depth(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(depth) if depth > 0 => Ok(depth),
        _ => Err(ConfigError::InvalidMaxDepth(raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("AVRAM_CORPUS_ROOT must not be empty")]
    EmptyRoot,
    #[error("invalid AVRAM_MAX_DEPTH {0:?}: expected a positive integer")]
    InvalidMaxDepth(String),
}
