//! The compiled, immutable validation plan.

use serde_json::Value;

use crate::compiler::CompileOptions;
use crate::keyword::{NodeId, SchemaNode};
use crate::validator;
use crate::violation::ValidationResult;

/// A schema compiled into an arena of nodes.
///
/// Immutable once built. Validation borrows it shared, so one instance can
/// serve any number of threads without locking.
#[derive(Debug)]
pub struct CompiledSchema {
    nodes: Vec<SchemaNode>,
    root: NodeId,
    options: CompileOptions,
}

impl CompiledSchema {
    pub(crate) fn new(nodes: Vec<SchemaNode>, root: NodeId, options: CompileOptions) -> Self {
        Self {
            nodes,
            root,
            options,
        }
    }

    /// Validate `instance`, collecting every violation.
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        validator::validate(self, instance)
    }

    /// Returns true if `instance` satisfies the schema.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validate(instance).valid
    }

    /// The node validation starts from.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena. Recursive references do not add nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// JSON Pointer of a node inside the schema document.
    pub fn pointer(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.index()).map(|node| node.pointer.as_str())
    }

    pub(crate) fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn compiled_schema_is_send_and_sync() {
        assert_send_sync::<CompiledSchema>();
    }

    #[test]
    fn node_pointers_follow_the_document() {
        let compiled = compile(&json!({"properties": {"a/b": {"type": "string"}}})).unwrap();
        assert_eq!(compiled.pointer(compiled.root()), Some(""));
        assert_eq!(compiled.pointer(NodeId(1)), Some("/properties/a~1b"));
        assert_eq!(compiled.pointer(NodeId(2)), None);
    }
}
