//! # avram-corpus: Corpus Harness
//!
//! Runs the Avram fixture corpus through the schema engine.
//!
//! ## Responsibilities
//!
//! - **Loading:** JSON and YAML documents into `serde_json::Value`, keeping
//!   key order and rejecting unquoted numeric YAML keys (field tags).
//! - **Enumeration:** schema fixtures (`valid*`/`invalid*`), test-case sets
//!   and draft-06 instance suites, each sorted by file name.
//! - **Checking:** every entry against the Avram format and the test-case
//!   format, with per-section pass/fail reports.
//!
//! All compiled schemas go through one [`avram_schema::SchemaCache`].

pub mod case;
pub mod config;
pub mod document;
pub mod error;
pub mod fixture;
pub mod harness;

// Re-export primary types.
pub use case::{test_sets, InstanceCase, TestCase, TestSet};
pub use config::{ConfigError, CorpusConfig};
pub use document::{load_document, parse_yaml};
pub use error::{CheckFailure, CorpusError};
pub use fixture::{schema_fixtures, SchemaFixture};
pub use harness::{CorpusReport, CorpusSummary, Failure, Harness};
