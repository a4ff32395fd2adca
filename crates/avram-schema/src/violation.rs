//! # Violations
//!
//! Structured results of validating an instance against a compiled schema.
//! A [`Violation`] is data, not an error: a `validate` call always succeeds
//! and reports every mismatch it found, in depth-first schema-declaration
//! order.

use std::fmt;

use serde::Serialize;

/// The constraint family that produced a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// The `false` schema rejects every instance.
    FalseSchema,
    /// `type`
    Type,
    /// `enum`
    Enum,
    /// `const`
    Const,
    /// `required`
    Required,
    /// `additionalProperties: false` rejected a property.
    AdditionalProperties,
    /// `minProperties`
    MinProperties,
    /// `maxProperties`
    MaxProperties,
    /// A property dependency listed in `dependencies` is missing.
    Dependencies,
    /// `additionalItems: false` rejected an item.
    AdditionalItems,
    /// `minItems`
    MinItems,
    /// `maxItems`
    MaxItems,
    /// `uniqueItems`
    UniqueItems,
    /// No array element matched `contains`.
    Contains,
    /// `minimum`
    Minimum,
    /// `maximum`
    Maximum,
    /// `exclusiveMinimum`
    ExclusiveMinimum,
    /// `exclusiveMaximum`
    ExclusiveMaximum,
    /// `multipleOf`
    MultipleOf,
    /// `minLength`
    MinLength,
    /// `maxLength`
    MaxLength,
    /// `pattern`
    Pattern,
    /// `format`
    Format,
    /// No `anyOf` branch matched.
    AnyOf,
    /// No `oneOf` branch matched.
    OneOfNoMatch,
    /// More than one `oneOf` branch matched.
    OneOfMultipleMatch,
    /// The `not` subschema matched.
    Not,
    /// The instance is nested deeper than the configured depth cap.
    DepthExceeded,
    /// A reference cycle revisited a schema without consuming any input.
    CircularRef,
}

impl ViolationKind {
    /// Keyword-style name used in human-readable output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FalseSchema => "falseSchema",
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Const => "const",
            Self::Required => "required",
            Self::AdditionalProperties => "additionalProperties",
            Self::MinProperties => "minProperties",
            Self::MaxProperties => "maxProperties",
            Self::Dependencies => "dependencies",
            Self::AdditionalItems => "additionalItems",
            Self::MinItems => "minItems",
            Self::MaxItems => "maxItems",
            Self::UniqueItems => "uniqueItems",
            Self::Contains => "contains",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::ExclusiveMinimum => "exclusiveMinimum",
            Self::ExclusiveMaximum => "exclusiveMaximum",
            Self::MultipleOf => "multipleOf",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Pattern => "pattern",
            Self::Format => "format",
            Self::AnyOf => "anyOf",
            Self::OneOfNoMatch => "oneOfNoMatch",
            Self::OneOfMultipleMatch => "oneOfMultipleMatch",
            Self::Not => "not",
            Self::DepthExceeded => "depthExceeded",
            Self::CircularRef => "circularRef",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mismatch between an instance and a constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON Pointer to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer to the keyword in the schema document that failed.
    pub schema_path: String,
    /// Which constraint family failed.
    pub kind: ViolationKind,
    /// Human-readable description of the violation.
    pub message: String,
    /// Explanatory violations of the closest `anyOf`/`oneOf` branch.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Violation>,
}

impl Violation {
    pub(crate) fn new(
        kind: ViolationKind,
        instance_path: String,
        schema_path: &str,
        message: String,
    ) -> Self {
        Self {
            instance_path,
            schema_path: schema_path.to_string(),
            kind,
            message,
            causes: Vec::new(),
        }
    }

    pub(crate) fn with_causes(mut self, causes: Vec<Violation>) -> Self {
        self.causes = causes;
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {} [{}]", self.message, self.schema_path)
        } else {
            write!(
                f,
                "  {}: {} [{}]",
                self.instance_path, self.message, self.schema_path
            )
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Outcome of validating one instance.
///
/// `valid` is always equal to `violations.is_empty()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// Whether the instance satisfied every constraint.
    pub valid: bool,
    /// Every violation found, in depth-first schema-declaration order.
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// Returns true if the instance is valid.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the violations found.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the result and returns its violations.
    pub fn into_violations(self) -> ValidationViolations {
        self.violations.into()
    }
}

impl From<Vec<Violation>> for ValidationResult {
    fn from(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}
