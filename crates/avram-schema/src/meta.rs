//! # Draft-06 Meta-Schema
//!
//! The embedded draft-06 meta-schema, extended with `if`/`then`/`else`, and
//! its process-wide compiled form.
//!
//! The meta-schema is compiled by the same engine it guards, with the
//! meta-check skipped. Compilation happens at most once per process; every
//! later call returns the shared instance.

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::schema::CompiledSchema;

/// Canonical URI of the draft-06 meta-schema.
pub const DRAFT_06_URI: &str = "http://json-schema.org/draft-06/schema#";

const DRAFT_06_SOURCE: &str = include_str!("../meta/draft-06.json");

static DRAFT_06: OnceCell<CompiledSchema> = OnceCell::new();

/// Returns the compiled meta-schema, compiling it on first use.
///
/// # Errors
///
/// [`CompileError::Bootstrap`] if the embedded document is malformed.
pub fn draft06() -> Result<&'static CompiledSchema, CompileError> {
    DRAFT_06.get_or_try_init(|| {
        tracing::debug!("bootstrapping draft-06 meta-schema");
        Compiler::new().compile_unchecked(&document()?)
    })
}

/// Parse the embedded meta-schema document.
pub fn document() -> Result<Value, CompileError> {
    serde_json::from_str(DRAFT_06_SOURCE).map_err(|e| CompileError::Bootstrap(e.to_string()))
}

/// Returns true if `uri` names draft-06, with or without the empty fragment
/// and over either scheme.
pub fn is_draft06_uri(uri: &str) -> bool {
    let uri = uri.strip_suffix('#').unwrap_or(uri);
    let rest = uri
        .strip_prefix("http://")
        .or_else(|| uri.strip_prefix("https://"));
    rest == Some("json-schema.org/draft-06/schema")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_schema_is_compiled_once() {
        let first = draft06().unwrap() as *const CompiledSchema;
        let second = draft06().unwrap() as *const CompiledSchema;
        assert_eq!(first, second);
    }

    #[test]
    fn meta_schema_validates_itself() {
        let doc = document().unwrap();
        assert!(draft06().unwrap().is_valid(&doc));
    }

    #[test]
    fn meta_schema_accepts_conditionals() {
        let meta = draft06().unwrap();
        assert!(meta.is_valid(&json!({"if": {"type": "string"}, "then": {"minLength": 1}})));
        assert!(!meta.is_valid(&json!({"if": 3})));
    }

    #[test]
    fn draft06_uri_variants() {
        assert!(is_draft06_uri(DRAFT_06_URI));
        assert!(is_draft06_uri("http://json-schema.org/draft-06/schema"));
        assert!(is_draft06_uri("https://json-schema.org/draft-06/schema#"));
        assert!(!is_draft06_uri("http://json-schema.org/draft-07/schema#"));
        assert!(!is_draft06_uri("json-schema.org/draft-06/schema"));
    }
}
