//! # Schema Compiler
//!
//! Turns a draft-06 schema document into a [`CompiledSchema`].
//!
//! ## Passes
//!
//! 1. **Meta-validation.** The document is validated against the embedded
//!    draft-06 meta-schema. All violations are collected.
//! 2. **Index.** Every schema position in the document gets a [`NodeId`],
//!    keyed by its JSON Pointer. `$id` values register resource URIs and
//!    plain-name fragments and change the base URI for nested references.
//! 3. **Link.** Each node is built into its constraint list, in keyword
//!    declaration order. `$ref` values resolve to the id of their target, so
//!    recursive schemas never expand. Targets outside the indexed positions
//!    are indexed on demand.
//!
//! Reference errors short-circuit: the first unresolved or unsupported
//! reference aborts compilation.

use std::collections::HashMap;

use serde_json::{Map, Value};
use url::Url;

use crate::error::CompileError;
use crate::format::Format;
use crate::keyword::{
    Constraint, Dependency, Items, Keyword, NodeId, NodeKind, Pattern, PrimitiveType, SchemaNode,
};
use crate::meta;
use crate::pointer;
use crate::schema::CompiledSchema;
use crate::value::show;
use crate::violation::ViolationKind;

/// Default cap on instance nesting depth during validation.
///
/// Matches the nesting limit of `serde_json`'s parser, so any parsed
/// document validates fully, and keeps recursion within the 2 MiB stack of
/// a spawned thread even in debug builds. Raise it with
/// [`Compiler::max_depth`] when validating on a larger stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Base URI for documents without an absolute `$id`.
const DEFAULT_BASE: &str = "json-schema:///";

/// Options carried by a compiled schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum instance nesting depth the validator descends into.
    pub max_depth: usize,
    /// Whether `format` is asserted. When false it is an annotation only.
    pub validate_formats: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            validate_formats: true,
        }
    }
}

/// Builder-style entry point for compilation.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// A compiler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A compiler with explicit options.
    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Set the validator depth cap.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    /// Enable or disable `format` assertions.
    pub fn validate_formats(mut self, enabled: bool) -> Self {
        self.options.validate_formats = enabled;
        self
    }

    /// The options compiled schemas will carry.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a schema document.
    ///
    /// # Errors
    ///
    /// - [`CompileError::SchemaInvalid`] with every meta-schema violation.
    /// - [`CompileError::UnsupportedConstruct`] for a foreign `$schema`
    ///   dialect or a remote `$ref`.
    /// - [`CompileError::UnresolvedRef`] when a local `$ref` target is
    ///   missing.
    /// - [`CompileError::CircularRef`] when references loop with no
    ///   constraint in between.
    pub fn compile(&self, document: &Value) -> Result<CompiledSchema, CompileError> {
        let result = meta::draft06()?.validate(document);
        if !result.valid {
            tracing::debug!(
                violations = result.violations.len(),
                "schema rejected by draft-06 meta-schema"
            );
            return Err(CompileError::SchemaInvalid(result.into_violations()));
        }
        check_dialect(document)?;
        self.compile_unchecked(document)
    }

    /// Compile without meta-validation. Used to bootstrap the meta-schema.
    pub(crate) fn compile_unchecked(&self, document: &Value) -> Result<CompiledSchema, CompileError> {
        let base = Url::parse(DEFAULT_BASE).map_err(|e| CompileError::Bootstrap(e.to_string()))?;
        let mut builder = Builder::new(document, &self.options);
        builder.resources.insert(base.to_string(), String::new());
        let root = builder.index(document, String::new(), &base)?;
        builder.link()?;
        let nodes = builder.nodes;
        check_ref_cycles(&nodes)?;
        tracing::debug!(nodes = nodes.len(), "compiled schema");
        Ok(CompiledSchema::new(nodes, root, self.options.clone()))
    }
}

/// Compile a schema document with default options.
pub fn compile(document: &Value) -> Result<CompiledSchema, CompileError> {
    Compiler::new().compile(document)
}

fn check_dialect(document: &Value) -> Result<(), CompileError> {
    let Some(dialect) = document.get("$schema").and_then(Value::as_str) else {
        return Ok(());
    };
    if meta::is_draft06_uri(dialect) {
        Ok(())
    } else {
        Err(CompileError::UnsupportedConstruct {
            keyword: "$schema".to_string(),
            pointer: String::new(),
            detail: format!("dialect {dialect} is not draft-06"),
        })
    }
}

fn is_schema(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Bool(_))
}

fn check_ref_cycles(nodes: &[SchemaNode]) -> Result<(), CompileError> {
    for (start, node) in nodes.iter().enumerate() {
        let mut current = start;
        let mut steps = 0usize;
        while let NodeKind::Ref(target) = &nodes[current].kind {
            current = target.index();
            steps += 1;
            if current == start || steps > nodes.len() {
                return Err(CompileError::CircularRef {
                    pointer: node.pointer.clone(),
                });
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Slot<'d> {
    value: &'d Value,
    pointer: String,
    base: Url,
}

struct Builder<'d, 'o> {
    document: &'d Value,
    options: &'o CompileOptions,
    slots: Vec<Slot<'d>>,
    by_pointer: HashMap<String, NodeId>,
    /// Resource URI (without fragment) → pointer of the resource root.
    resources: HashMap<String, String>,
    /// Full URI of a plain-name `$id` → node.
    anchors: HashMap<String, NodeId>,
    nodes: Vec<SchemaNode>,
}

impl<'d, 'o> Builder<'d, 'o> {
    fn new(document: &'d Value, options: &'o CompileOptions) -> Self {
        Self {
            document,
            options,
            slots: Vec::new(),
            by_pointer: HashMap::new(),
            resources: HashMap::new(),
            anchors: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Index pass
    // -----------------------------------------------------------------------

    fn index(&mut self, value: &'d Value, pointer: String, base: &Url) -> Result<NodeId, CompileError> {
        if let Some(&id) = self.by_pointer.get(&pointer) {
            return Ok(id);
        }
        let id = NodeId(self.slots.len());
        let mut base = base.clone();
        let object = value.as_object();
        let is_ref = object.is_some_and(|map| map.contains_key("$ref"));

        if let Some(scope) = object
            .filter(|_| !is_ref)
            .and_then(|map| map.get("$id"))
            .and_then(Value::as_str)
        {
            base = self.register_id(scope, &base, &pointer, id)?;
        }

        self.by_pointer.insert(pointer.clone(), id);
        self.slots.push(Slot {
            value,
            pointer: pointer.clone(),
            base: base.clone(),
        });

        if let Some(map) = object {
            for (key, child) in map {
                // Siblings of `$ref` are ignored, but definitions next to a
                // root reference are still addressable.
                if is_ref && key != "definitions" {
                    continue;
                }
                self.index_keyword(key, child, &pointer, &base)?;
            }
        }
        Ok(id)
    }

    fn index_keyword(
        &mut self,
        key: &str,
        child: &'d Value,
        pointer: &str,
        base: &Url,
    ) -> Result<(), CompileError> {
        let at = pointer::join(pointer, key);
        match key {
            "properties" | "patternProperties" | "definitions" | "dependencies" => {
                if let Value::Object(members) = child {
                    for (name, sub) in members {
                        if is_schema(sub) {
                            self.index(sub, pointer::join(&at, name), base)?;
                        }
                    }
                }
            }
            "additionalProperties" | "additionalItems" | "propertyNames" | "contains" | "not"
            | "if" | "then" | "else" => {
                if is_schema(child) {
                    self.index(child, at, base)?;
                }
            }
            "items" | "allOf" | "anyOf" | "oneOf" => match child {
                Value::Array(list) => {
                    for (i, sub) in list.iter().enumerate() {
                        if is_schema(sub) {
                            self.index(sub, pointer::join_index(&at, i), base)?;
                        }
                    }
                }
                single if key == "items" && is_schema(single) => {
                    self.index(single, at, base)?;
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn register_id(
        &mut self,
        scope: &str,
        base: &Url,
        pointer: &str,
        id: NodeId,
    ) -> Result<Url, CompileError> {
        let resolved = base
            .join(scope)
            .map_err(|e| CompileError::UnsupportedConstruct {
                keyword: "$id".to_string(),
                pointer: pointer.to_string(),
                detail: format!("cannot resolve {scope}: {e}"),
            })?;
        if resolved.fragment().is_some_and(|f| !f.is_empty()) {
            self.anchors.insert(resolved.to_string(), id);
        }
        let mut resource = resolved;
        resource.set_fragment(None);
        self.resources
            .entry(resource.to_string())
            .or_insert_with(|| pointer.to_string());
        Ok(resource)
    }

    // -----------------------------------------------------------------------
    // Link pass
    // -----------------------------------------------------------------------

    fn link(&mut self) -> Result<(), CompileError> {
        // On-demand indexing may append slots while linking.
        let mut next = 0;
        while next < self.slots.len() {
            let node = self.build(next)?;
            self.nodes.push(node);
            next += 1;
        }
        Ok(())
    }

    fn build(&mut self, index: usize) -> Result<SchemaNode, CompileError> {
        let Slot {
            value,
            pointer,
            base,
        } = self.slots[index].clone();
        let kind = match value {
            Value::Bool(b) => NodeKind::Bool(*b),
            Value::Object(map) => match map.get("$ref") {
                Some(Value::String(reference)) => {
                    NodeKind::Ref(self.resolve(reference, &base, &pointer)?)
                }
                Some(other) => {
                    return Err(CompileError::invalid(
                        ViolationKind::Type,
                        &pointer::join(&pointer, "$ref"),
                        "/properties/$ref/type",
                        format!("{} is not of type \"string\"", show(other)),
                    ))
                }
                None => NodeKind::Keywords(self.keywords(map, &pointer)?),
            },
            other => {
                return Err(CompileError::invalid(
                    ViolationKind::Type,
                    &pointer,
                    "/type",
                    format!("{} is not of type \"object\", \"boolean\"", show(other)),
                ))
            }
        };
        Ok(SchemaNode { pointer, kind })
    }

    fn resolve(&mut self, reference: &str, base: &Url, pointer: &str) -> Result<NodeId, CompileError> {
        let unresolved = || CompileError::UnresolvedRef {
            reference: reference.to_string(),
            pointer: pointer.to_string(),
        };
        let target = base
            .join(reference)
            .map_err(|e| CompileError::UnsupportedConstruct {
                keyword: "$ref".to_string(),
                pointer: pointer.to_string(),
                detail: format!("cannot resolve {reference}: {e}"),
            })?;
        if let Some(&id) = self.anchors.get(target.as_str()) {
            return Ok(id);
        }

        let fragment = target.fragment().unwrap_or_default().to_string();
        let mut resource = target;
        resource.set_fragment(None);
        let Some(root) = self.resources.get(resource.as_str()).cloned() else {
            return Err(CompileError::UnsupportedConstruct {
                keyword: "$ref".to_string(),
                pointer: pointer.to_string(),
                detail: format!("remote reference {reference} requires network access"),
            });
        };
        if !fragment.is_empty() && !fragment.starts_with('/') {
            return Err(unresolved());
        }
        let decoded = pointer::decode_fragment(&fragment).ok_or_else(unresolved)?;
        let target_pointer = format!("{root}{decoded}");
        tracing::trace!(reference, target = %target_pointer, "resolved reference");

        if let Some(&id) = self.by_pointer.get(&target_pointer) {
            return Ok(id);
        }
        let document = self.document;
        match pointer::resolve(document, &target_pointer) {
            Some(value) if is_schema(value) => self.index(value, target_pointer, &resource),
            _ => Err(unresolved()),
        }
    }

    fn child(&self, pointer: &str) -> Result<NodeId, CompileError> {
        self.by_pointer
            .get(pointer)
            .copied()
            .ok_or_else(|| CompileError::UnresolvedRef {
                reference: format!("#{pointer}"),
                pointer: pointer.to_string(),
            })
    }

    fn children(&self, value: &Value, at: &str) -> Result<Vec<NodeId>, CompileError> {
        match value {
            Value::Array(list) => (0..list.len())
                .map(|i| self.child(&pointer::join_index(at, i)))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }

    fn members(&self, value: &Value, at: &str) -> Result<Vec<(String, NodeId)>, CompileError> {
        match value {
            Value::Object(map) => map
                .iter()
                .filter(|(_, sub)| is_schema(sub))
                .map(|(name, _)| Ok((name.clone(), self.child(&pointer::join(at, name))?)))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }

    fn optional_child(&self, map: &Map<String, Value>, node: &str, key: &str) -> Result<Option<NodeId>, CompileError> {
        match map.get(key) {
            Some(value) if is_schema(value) => self.child(&pointer::join(node, key)).map(Some),
            _ => Ok(None),
        }
    }

    fn keywords(&mut self, map: &'d Map<String, Value>, node: &str) -> Result<Vec<Keyword>, CompileError> {
        let mut keywords = Vec::new();
        for (key, value) in map {
            let at = pointer::join(node, key);
            if let Some(constraint) = self.constraint(map, node, key, value, &at)? {
                keywords.push(Keyword {
                    pointer: at,
                    constraint,
                });
            }
        }
        Ok(keywords)
    }

    fn constraint(
        &mut self,
        map: &'d Map<String, Value>,
        node: &str,
        key: &str,
        value: &'d Value,
        at: &str,
    ) -> Result<Option<Constraint>, CompileError> {
        let constraint = match key {
            "type" => Constraint::Type(types(value, at)?),
            "enum" => match value {
                Value::Array(options) => Constraint::Enum(options.clone()),
                _ => return Ok(None),
            },
            "const" => Constraint::Const(value.clone()),

            // Objects
            "properties" => Constraint::Properties(self.members(value, at)?),
            "patternProperties" => {
                let mut patterns = Vec::new();
                for (source, id) in self.members(value, at)? {
                    let regex = pattern(&source, &pointer::join(at, &source), "/properties/patternProperties")?;
                    patterns.push((regex, id));
                }
                Constraint::PatternProperties(patterns)
            }
            "additionalProperties" => {
                let names = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|properties| properties.keys().cloned().collect())
                    .unwrap_or_default();
                let patterns = match map.get("patternProperties").and_then(Value::as_object) {
                    Some(pattern_properties) => {
                        let parent = pointer::join(node, "patternProperties");
                        pattern_properties
                            .keys()
                            .map(|source| {
                                pattern(source, &pointer::join(&parent, source), "/properties/patternProperties")
                            })
                            .collect::<Result<Vec<_>, _>>()?
                    }
                    None => Vec::new(),
                };
                Constraint::AdditionalProperties {
                    names,
                    patterns,
                    schema: self.child(at)?,
                }
            }
            "required" => Constraint::Required(strings(value)),
            "propertyNames" => Constraint::PropertyNames(self.child(at)?),
            "minProperties" => Constraint::MinProperties(count(value, at)?),
            "maxProperties" => Constraint::MaxProperties(count(value, at)?),
            "dependencies" => {
                let Value::Object(dependencies) = value else {
                    return Ok(None);
                };
                let mut compiled = Vec::with_capacity(dependencies.len());
                for (name, dependency) in dependencies {
                    let dependency = match dependency {
                        Value::Array(_) => Dependency::Properties(strings(dependency)),
                        schema if is_schema(schema) => {
                            Dependency::Schema(self.child(&pointer::join(at, name))?)
                        }
                        _ => continue,
                    };
                    compiled.push((name.clone(), dependency));
                }
                Constraint::Dependencies(compiled)
            }

            // Arrays
            "items" => match value {
                Value::Array(_) => Constraint::Items(Items::Tuple(self.children(value, at)?)),
                _ => Constraint::Items(Items::Single(self.child(at)?)),
            },
            "additionalItems" => match map.get("items") {
                Some(Value::Array(tuple)) => Constraint::AdditionalItems {
                    offset: tuple.len(),
                    schema: self.child(at)?,
                },
                _ => return Ok(None),
            },
            "minItems" => Constraint::MinItems(count(value, at)?),
            "maxItems" => Constraint::MaxItems(count(value, at)?),
            "uniqueItems" => match value {
                Value::Bool(true) => Constraint::UniqueItems,
                _ => return Ok(None),
            },
            "contains" => Constraint::Contains(self.child(at)?),

            // Numbers
            "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf" => {
                let Value::Number(limit) = value else {
                    return Ok(None);
                };
                let limit = limit.clone();
                match key {
                    "minimum" => Constraint::Minimum(limit),
                    "maximum" => Constraint::Maximum(limit),
                    "exclusiveMinimum" => Constraint::ExclusiveMinimum(limit),
                    "exclusiveMaximum" => Constraint::ExclusiveMaximum(limit),
                    _ => Constraint::MultipleOf(limit),
                }
            }

            // Strings
            "minLength" => Constraint::MinLength(count(value, at)?),
            "maxLength" => Constraint::MaxLength(count(value, at)?),
            "pattern" => match value {
                Value::String(source) => {
                    Constraint::Pattern(pattern(source, at, "/properties/pattern/format")?)
                }
                _ => return Ok(None),
            },
            "format" => {
                if !self.options.validate_formats {
                    return Ok(None);
                }
                match value.as_str().and_then(Format::from_name) {
                    Some(format) => Constraint::Format(format),
                    None => return Ok(None),
                }
            }

            // Combinators
            "allOf" => Constraint::AllOf(self.children(value, at)?),
            "anyOf" => Constraint::AnyOf(self.children(value, at)?),
            "oneOf" => Constraint::OneOf(self.children(value, at)?),
            "not" => Constraint::Not(self.child(at)?),
            "if" => Constraint::Conditional {
                condition: self.child(at)?,
                then: self.optional_child(map, node, "then")?,
                otherwise: self.optional_child(map, node, "else")?,
            },

            _ => return Ok(None),
        };
        Ok(Some(constraint))
    }
}

fn types(value: &Value, at: &str) -> Result<Vec<PrimitiveType>, CompileError> {
    let parse = |name: &Value| {
        name.as_str()
            .and_then(PrimitiveType::from_name)
            .ok_or_else(|| {
                CompileError::invalid(
                    ViolationKind::Enum,
                    at,
                    "/definitions/simpleTypes/enum",
                    format!("{} is not a primitive type name", show(name)),
                )
            })
    };
    match value {
        Value::Array(names) => names.iter().map(parse).collect(),
        single => Ok(vec![parse(single)?]),
    }
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn count(value: &Value, at: &str) -> Result<u64, CompileError> {
    let n = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    });
    n.ok_or_else(|| {
        CompileError::invalid(
            ViolationKind::Minimum,
            at,
            "/definitions/nonNegativeInteger",
            format!("{} is not a non-negative integer", show(value)),
        )
    })
}

fn pattern(source: &str, at: &str, schema_path: &str) -> Result<Pattern, CompileError> {
    Pattern::new(source).map_err(|e| {
        CompileError::invalid(
            ViolationKind::Format,
            at,
            schema_path,
            format!("\"{source}\" is not a \"regex\": {e}"),
        )
    })
}
