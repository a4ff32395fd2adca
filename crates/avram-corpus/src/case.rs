//! Test-case sets: YAML files holding a sequence of test cases.
//!
//! Cases are kept as raw documents so the harness can check their shape
//! against the test-case format before interpreting them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::load_document;
use crate::error::CorpusError;
use crate::fixture::{file_name, list_documents};

/// A test case: a schema plus optional instances with expected outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub description: String,
    pub schema: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<InstanceCase>,
}

/// Instance data embedded in a test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data: Value,
    pub valid: bool,
}

impl TestCase {
    /// Interpret a raw case document.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}

/// The cases of one YAML file.
#[derive(Debug, Clone)]
pub struct TestSet {
    /// File stem, used in reports.
    pub name: String,
    pub path: PathBuf,
    pub cases: Vec<Value>,
}

impl TestSet {
    /// Report name of the case at `index`, e.g. `fields testcase 2 "empty"`.
    pub fn case_name(&self, index: usize) -> String {
        let description = self
            .cases
            .get(index)
            .and_then(|case| case.get("description"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        format!("{} testcase {} \"{}\"", self.name, index + 1, description)
    }
}

/// Load every `.yaml`/`.yml` test set in `dir`, sorted by file name.
pub fn test_sets(dir: &Path) -> Result<Vec<TestSet>, CorpusError> {
    let mut sets = Vec::new();
    for path in list_documents(dir)? {
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            continue;
        }
        let cases = match load_document(&path)? {
            Value::Array(cases) => cases,
            _ => return Err(CorpusError::NotASequence { path }),
        };
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name(&path));
        tracing::debug!(set = %name, cases = cases.len(), "loaded test set");
        sets.push(TestSet { name, path, cases });
    }
    Ok(sets)
}
