//! Schema fixtures: standalone Avram schema documents whose file name says
//! whether the format schema must accept them (`valid…`) or reject them
//! (`invalid…`).

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::document::{is_document, load_document};
use crate::error::CorpusError;

/// One schema fixture and its expected outcome.
#[derive(Debug, Clone)]
pub struct SchemaFixture {
    /// File name, used in reports.
    pub name: String,
    pub path: PathBuf,
    pub document: Value,
    pub expected_valid: bool,
}

/// Expected outcome encoded in a fixture file name, if any.
pub fn expectation(file_name: &str) -> Option<bool> {
    if file_name.starts_with("invalid") {
        Some(false)
    } else if file_name.starts_with("valid") {
        Some(true)
    } else {
        None
    }
}

/// Load every fixture in `dir`, sorted by file name.
///
/// Documents without a `valid`/`invalid` prefix are skipped with a warning.
pub fn schema_fixtures(dir: &Path) -> Result<Vec<SchemaFixture>, CorpusError> {
    let mut fixtures = Vec::new();
    for path in list_documents(dir)? {
        let name = file_name(&path);
        let Some(expected_valid) = expectation(&name) else {
            tracing::warn!(path = %path.display(), "skipping fixture without valid/invalid prefix");
            continue;
        };
        let document = load_document(&path)?;
        fixtures.push(SchemaFixture {
            name,
            path,
            document,
            expected_valid,
        });
    }
    tracing::debug!(dir = %dir.display(), count = fixtures.len(), "loaded schema fixtures");
    Ok(fixtures)
}

/// JSON/YAML files directly inside `dir`, sorted by file name.
pub(crate) fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let io_err = |source| CorpusError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_document(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
