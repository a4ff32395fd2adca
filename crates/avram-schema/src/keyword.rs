//! # Compiled Constraints
//!
//! The closed set of constraint variants a compiled schema is made of, and
//! the arena node types that hold them.
//!
//! A compiled schema is an arena of [`SchemaNode`]s addressed by [`NodeId`].
//! Child schemas are referenced by id, and a `$ref` node stores the id of its
//! resolved target, so recursive schemas form cycles through ids instead of
//! through ownership.

use fancy_regex::Regex;
use serde_json::{Number, Value};

use crate::format::Format;
use crate::value;

/// Stable identity of a node in a compiled schema's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A JSON primitive type name as used by the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl PrimitiveType {
    /// Parse a `type` keyword value.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "array" => Self::Array,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "null" => Self::Null,
            "number" => Self::Number,
            "object" => Self::Object,
            "string" => Self::String,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Null => "null",
            Self::Number => "number",
            Self::Object => "object",
            Self::String => "string",
        }
    }

    /// Returns true if `instance` is of this type. `integer` accepts any
    /// number with a zero fractional part; `number` accepts integers.
    pub fn matches(&self, instance: &Value) -> bool {
        match (self, instance) {
            (Self::Array, Value::Array(_))
            | (Self::Boolean, Value::Bool(_))
            | (Self::Null, Value::Null)
            | (Self::Number, Value::Number(_))
            | (Self::Object, Value::Object(_))
            | (Self::String, Value::String(_)) => true,
            (Self::Integer, Value::Number(n)) => value::is_integer(n),
            _ => false,
        }
    }
}

/// `items` in either its single-schema or tuple form.
#[derive(Debug)]
pub(crate) enum Items {
    Single(NodeId),
    Tuple(Vec<NodeId>),
}

/// One entry of `dependencies`.
#[derive(Debug)]
pub(crate) enum Dependency {
    Properties(Vec<String>),
    Schema(NodeId),
}

/// A compiled `pattern` or `patternProperties` key.
///
/// ECMA-262 constructs such as lookaround and backreferences are supported.
#[derive(Debug)]
pub(crate) struct Pattern(Regex);

impl Pattern {
    pub(crate) fn new(source: &str) -> Result<Self, fancy_regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Unanchored search. A match that exceeds the backtracking limit counts
    /// as no match.
    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text).unwrap_or(false)
    }

    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A single compiled keyword.
#[derive(Debug)]
pub(crate) enum Constraint {
    Type(Vec<PrimitiveType>),
    Enum(Vec<Value>),
    Const(Value),
    Properties(Vec<(String, NodeId)>),
    PatternProperties(Vec<(Pattern, NodeId)>),
    AdditionalProperties {
        names: Vec<String>,
        patterns: Vec<Pattern>,
        schema: NodeId,
    },
    Required(Vec<String>),
    PropertyNames(NodeId),
    MinProperties(u64),
    MaxProperties(u64),
    Dependencies(Vec<(String, Dependency)>),
    Items(Items),
    AdditionalItems {
        offset: usize,
        schema: NodeId,
    },
    MinItems(u64),
    MaxItems(u64),
    UniqueItems,
    Contains(NodeId),
    Minimum(Number),
    Maximum(Number),
    ExclusiveMinimum(Number),
    ExclusiveMaximum(Number),
    MultipleOf(Number),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Pattern),
    Format(Format),
    AllOf(Vec<NodeId>),
    AnyOf(Vec<NodeId>),
    OneOf(Vec<NodeId>),
    Not(NodeId),
    Conditional {
        condition: NodeId,
        then: Option<NodeId>,
        otherwise: Option<NodeId>,
    },
}

impl Constraint {
    /// Keywords that only apply to one instance type. They are skipped when
    /// a sibling `type` constraint already rejected the instance.
    pub(crate) fn is_type_specific(&self) -> bool {
        !matches!(
            self,
            Self::Type(_)
                | Self::Enum(_)
                | Self::Const(_)
                | Self::AllOf(_)
                | Self::AnyOf(_)
                | Self::OneOf(_)
                | Self::Not(_)
                | Self::Conditional { .. }
        )
    }
}

/// A constraint together with the schema location of its keyword.
#[derive(Debug)]
pub(crate) struct Keyword {
    pub(crate) pointer: String,
    pub(crate) constraint: Constraint,
}

/// What a node in the arena evaluates to.
#[derive(Debug)]
pub(crate) enum NodeKind {
    Bool(bool),
    Ref(NodeId),
    Keywords(Vec<Keyword>),
}

/// A node in the compiled arena.
#[derive(Debug)]
pub(crate) struct SchemaNode {
    /// JSON Pointer of this schema inside its document.
    pub(crate) pointer: String,
    pub(crate) kind: NodeKind,
}
