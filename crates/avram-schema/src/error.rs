//! # Compile Errors
//!
//! Failures that abort compilation. A schema that cannot be compiled is
//! never treated as permissive: callers always receive one of these.

use thiserror::Error;

use crate::violation::{ValidationViolations, Violation, ViolationKind};

/// Error returned by [`crate::Compiler::compile`].
#[derive(Error, Debug)]
pub enum CompileError {
    /// The document does not satisfy the draft-06 meta-schema.
    #[error("schema is not a valid draft-06 schema:\n{0}")]
    SchemaInvalid(ValidationViolations),

    /// A `$ref` target does not exist within the compilation unit.
    #[error("unresolved reference {reference} at {pointer}")]
    UnresolvedRef {
        /// The `$ref` value as written.
        reference: String,
        /// JSON Pointer to the schema holding the `$ref`.
        pointer: String,
    },

    /// A recognized draft feature that this engine does not implement.
    #[error("unsupported {keyword} at {pointer}: {detail}")]
    UnsupportedConstruct {
        /// The keyword that triggered the error.
        keyword: String,
        /// JSON Pointer to the schema holding the keyword.
        pointer: String,
        /// Human-readable reason.
        detail: String,
    },

    /// A chain of references leads back to itself with no constraint in
    /// between.
    #[error("circular reference chain through {pointer}")]
    CircularRef {
        /// JSON Pointer to a reference on the cycle.
        pointer: String,
    },

    /// The document could not be serialized for cache lookup.
    #[error("schema serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The embedded meta-schema could not be compiled.
    #[error("meta-schema bootstrap failed: {0}")]
    Bootstrap(String),
}

impl CompileError {
    /// Build a [`CompileError::SchemaInvalid`] carrying a single violation.
    pub(crate) fn invalid(
        kind: ViolationKind,
        instance_path: &str,
        schema_path: &str,
        message: String,
    ) -> Self {
        Self::SchemaInvalid(
            vec![Violation::new(
                kind,
                instance_path.to_string(),
                schema_path,
                message,
            )]
            .into(),
        )
    }

    /// Returns the meta-schema violations if this is a
    /// [`CompileError::SchemaInvalid`].
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::SchemaInvalid(violations) => Some(violations),
            _ => None,
        }
    }
}
