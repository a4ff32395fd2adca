//! # avram-schema: JSON Schema Draft-06 Compiler & Validator
//!
//! Compiles a JSON Schema draft-06 document into an immutable validation
//! plan and applies it to instance data, producing either "valid" or a
//! structured list of violations.
//!
//! ## Responsibilities
//!
//! - **Meta-validation:** every document is checked against the embedded
//!   draft-06 meta-schema before compilation. All violations are reported.
//! - **Reference resolution:** `$ref` is resolved at compile time over an
//!   arena of nodes. Recursive schemas share nodes instead of expanding.
//! - **Validation:** instances are walked against the compiled plan, and
//!   every violation is collected with instance and schema JSON Pointers.
//!
//! ## Design
//!
//! The crate performs no I/O. Documents arrive as [`serde_json::Value`];
//! loading files is the caller's concern. A [`CompiledSchema`] is
//! `Send + Sync` and can validate from many threads at once.
//!
//! ```
//! use avram_schema::compile;
//! use serde_json::json;
//!
//! let schema = compile(&json!({"type": "object", "required": ["tag"]})).unwrap();
//! assert!(schema.is_valid(&json!({"tag": "245"})));
//! assert!(!schema.is_valid(&json!({})));
//! ```

pub mod cache;
pub mod compiler;
pub mod error;
pub mod format;
mod keyword;
pub mod meta;
pub mod pointer;
mod schema;
pub mod validator;
pub mod value;
pub mod violation;

// Re-export primary types.
pub use cache::{SchemaCache, SchemaDigest};
pub use compiler::{compile, CompileOptions, Compiler, DEFAULT_MAX_DEPTH};
pub use error::CompileError;
pub use format::Format;
pub use keyword::{NodeId, PrimitiveType};
pub use schema::CompiledSchema;
pub use validator::validate;
pub use violation::{ValidationResult, ValidationViolations, Violation, ViolationKind};
