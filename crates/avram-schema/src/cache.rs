//! # Compiled Schema Cache
//!
//! Content-addressed store of compiled schemas. Documents are keyed by the
//! SHA-256 digest of their compact JSON serialization. Object key order is
//! part of the key: violations are reported in keyword declaration order, so
//! documents that differ only in key order compile to distinct entries.
//! Whitespace in the source text never reaches the key.
//!
//! Entries are insert-once: an existing entry is never replaced, and readers
//! get a shared [`Arc`] handle. Compile errors are not cached.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::schema::CompiledSchema;

/// SHA-256 digest of a schema document's compact serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaDigest([u8; 32]);

impl SchemaDigest {
    /// Digest a schema document.
    ///
    /// # Errors
    ///
    /// [`CompileError::Serialization`] if the document cannot be serialized.
    pub fn of(document: &Value) -> Result<Self, CompileError> {
        let bytes = serde_json::to_vec(document)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for SchemaDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Thread-safe, insert-once cache of compiled schemas.
#[derive(Debug, Default)]
pub struct SchemaCache {
    compiler: Compiler,
    entries: RwLock<HashMap<SchemaDigest, Arc<CompiledSchema>>>,
}

impl SchemaCache {
    /// A cache that compiles with `compiler`'s options.
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Look up an already-compiled document.
    pub fn get(&self, digest: &SchemaDigest) -> Option<Arc<CompiledSchema>> {
        self.entries.read().get(digest).cloned()
    }

    /// Return the cached compilation of `document`, compiling it on a miss.
    ///
    /// Compilation runs without holding the lock. When two callers race on
    /// the same document, the first insert wins and both receive it.
    pub fn get_or_compile(&self, document: &Value) -> Result<Arc<CompiledSchema>, CompileError> {
        let digest = SchemaDigest::of(document)?;
        if let Some(hit) = self.get(&digest) {
            tracing::trace!(%digest, "schema cache hit");
            return Ok(hit);
        }
        let compiled = Arc::new(self.compiler.compile(document)?);
        let mut entries = self.entries.write();
        let entry = entries.entry(digest).or_insert(compiled);
        tracing::debug!(%digest, nodes = entry.node_count(), "cached compiled schema");
        Ok(Arc::clone(entry))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
