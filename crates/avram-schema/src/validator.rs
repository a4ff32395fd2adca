//! # Instance Validator
//!
//! Walks a [`CompiledSchema`] against an instance and accumulates every
//! violation. Validation never stops at the first failure and never fails as
//! a call.
//!
//! All constraint evaluation dispatches through [`Evaluator::keyword`], which
//! handles the applicators that recurse into subschemas and hands leaf
//! assertions to [`assertion`].

use serde_json::{Map, Value};

use crate::keyword::{Constraint, Dependency, Items, Keyword, NodeId, NodeKind, PrimitiveType};
use crate::pointer::Location;
use crate::schema::CompiledSchema;
use crate::value::{self, show};
use crate::violation::{ValidationResult, Violation, ViolationKind};

/// Validate `instance` against `schema`.
pub fn validate(schema: &CompiledSchema, instance: &Value) -> ValidationResult {
    let mut evaluator = Evaluator {
        schema,
        active: Vec::new(),
    };
    let mut violations = Vec::new();
    evaluator.node(schema.root(), instance, &Location::root(), &mut violations);
    violations.into()
}

struct Evaluator<'s> {
    schema: &'s CompiledSchema,
    /// References currently being followed, keyed by instance depth.
    active: Vec<(usize, NodeId)>,
}

impl<'s> Evaluator<'s> {
    fn node(&mut self, id: NodeId, instance: &Value, location: &Location<'_>, out: &mut Vec<Violation>) {
        let node = self.schema.node(id);
        match &node.kind {
            NodeKind::Bool(true) => {}
            NodeKind::Bool(false) => out.push(Violation::new(
                ViolationKind::FalseSchema,
                location.to_pointer(),
                &node.pointer,
                format!("{} is not allowed by the false schema", show(instance)),
            )),
            NodeKind::Ref(target) => {
                // Along one evaluation path the instance depth never
                // decreases, so an equal depth means the same location.
                let key = (location.depth(), *target);
                if self.active.contains(&key) {
                    out.push(Violation::new(
                        ViolationKind::CircularRef,
                        location.to_pointer(),
                        &node.pointer,
                        "reference cycle revisits this location without consuming input".to_string(),
                    ));
                    return;
                }
                self.active.push(key);
                self.node(*target, instance, location, out);
                self.active.pop();
            }
            NodeKind::Keywords(keywords) => {
                let type_ok = keywords.iter().all(|keyword| match &keyword.constraint {
                    Constraint::Type(types) => types.iter().any(|ty| ty.matches(instance)),
                    _ => true,
                });
                for keyword in keywords {
                    if !type_ok && keyword.constraint.is_type_specific() {
                        continue;
                    }
                    self.keyword(keyword, instance, location, out);
                }
            }
        }
    }

    /// Evaluate a child schema one level deeper in the instance.
    fn descend(&mut self, id: NodeId, instance: &Value, location: &Location<'_>, out: &mut Vec<Violation>) {
        let max_depth = self.schema.options().max_depth;
        if location.depth() > max_depth {
            out.push(Violation::new(
                ViolationKind::DepthExceeded,
                location.to_pointer(),
                &self.schema.node(id).pointer,
                format!("instance nesting exceeds the maximum depth of {max_depth}"),
            ));
            return;
        }
        self.node(id, instance, location, out);
    }

    /// Evaluate `id` at the same location into a scratch list.
    fn attempt(&mut self, id: NodeId, instance: &Value, location: &Location<'_>) -> Vec<Violation> {
        let mut found = Vec::new();
        self.node(id, instance, location, &mut found);
        found
    }

    /// Single dispatch point over the constraint enum. Each family lives in
    /// its own method so the frame on the recursive path stays small.
    fn keyword(&mut self, keyword: &Keyword, instance: &Value, location: &Location<'_>, out: &mut Vec<Violation>) {
        let path = keyword.pointer.as_str();
        let constraint = &keyword.constraint;
        match (constraint, instance) {
            (
                Constraint::Properties(_)
                | Constraint::PatternProperties(_)
                | Constraint::AdditionalProperties { .. }
                | Constraint::PropertyNames(_)
                | Constraint::Dependencies(_),
                Value::Object(map),
            ) => self.object(constraint, instance, map, location, path, out),
            (
                Constraint::Items(_) | Constraint::AdditionalItems { .. } | Constraint::Contains(_),
                Value::Array(items),
            ) => self.array(constraint, instance, items, location, path, out),
            (
                Constraint::AllOf(_)
                | Constraint::AnyOf(_)
                | Constraint::OneOf(_)
                | Constraint::Not(_)
                | Constraint::Conditional { .. },
                _,
            ) => self.combinator(constraint, instance, location, path, out),
            _ => assertion(constraint, instance, location, path, out),
        }
    }

    // -----------------------------------------------------------------------
    // Object applicators
    // -----------------------------------------------------------------------

    fn object(
        &mut self,
        constraint: &Constraint,
        instance: &Value,
        map: &Map<String, Value>,
        location: &Location<'_>,
        path: &str,
        out: &mut Vec<Violation>,
    ) {
        match constraint {
            Constraint::Properties(properties) => {
                for (name, child) in properties {
                    if let Some(value) = map.get(name) {
                        self.descend(*child, value, &location.key(name), out);
                    }
                }
            }
            Constraint::PatternProperties(patterns) => {
                for (regex, child) in patterns {
                    for (name, value) in map {
                        if regex.is_match(name) {
                            self.descend(*child, value, &location.key(name), out);
                        }
                    }
                }
            }
            Constraint::AdditionalProperties {
                names,
                patterns,
                schema,
            } => {
                let rejects_all = self.is_false(*schema);
                for (name, value) in map {
                    if names.contains(name) || patterns.iter().any(|regex| regex.is_match(name)) {
                        continue;
                    }
                    let child = location.key(name);
                    if rejects_all {
                        out.push(Violation::new(
                            ViolationKind::AdditionalProperties,
                            child.to_pointer(),
                            path,
                            format!("additional property \"{name}\" is not allowed"),
                        ));
                    } else {
                        self.descend(*schema, value, &child, out);
                    }
                }
            }
            Constraint::PropertyNames(child) => {
                for name in map.keys() {
                    self.node(*child, &Value::String(name.clone()), location, out);
                }
            }
            Constraint::Dependencies(dependencies) => {
                for (name, dependency) in dependencies {
                    if !map.contains_key(name) {
                        continue;
                    }
                    match dependency {
                        Dependency::Properties(required) => {
                            missing(map, required, |property| {
                                out.push(Violation::new(
                                    ViolationKind::Dependencies,
                                    location.to_pointer(),
                                    path,
                                    format!("\"{property}\" is required by \"{name}\""),
                                ))
                            });
                        }
                        Dependency::Schema(child) => self.node(*child, instance, location, out),
                    }
                }
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Array applicators
    // -----------------------------------------------------------------------

    fn array(
        &mut self,
        constraint: &Constraint,
        instance: &Value,
        items: &[Value],
        location: &Location<'_>,
        path: &str,
        out: &mut Vec<Violation>,
    ) {
        match constraint {
            Constraint::Items(Items::Single(child)) => {
                for (i, item) in items.iter().enumerate() {
                    self.descend(*child, item, &location.index(i), out);
                }
            }
            Constraint::Items(Items::Tuple(children)) => {
                for (i, (child, item)) in children.iter().zip(items).enumerate() {
                    self.descend(*child, item, &location.index(i), out);
                }
            }
            Constraint::AdditionalItems { offset, schema } => {
                let rejects_all = self.is_false(*schema);
                for (i, item) in items.iter().enumerate().skip(*offset) {
                    let child = location.index(i);
                    if rejects_all {
                        out.push(Violation::new(
                            ViolationKind::AdditionalItems,
                            child.to_pointer(),
                            path,
                            format!("additional item at index {i} is not allowed"),
                        ));
                    } else {
                        self.descend(*schema, item, &child, out);
                    }
                }
            }
            Constraint::Contains(child) => {
                let matched = items.iter().enumerate().any(|(i, item)| {
                    let mut found = Vec::new();
                    self.descend(*child, item, &location.index(i), &mut found);
                    found.is_empty()
                });
                if !matched {
                    out.push(Violation::new(
                        ViolationKind::Contains,
                        location.to_pointer(),
                        path,
                        format!("{} does not contain an item matching the contains schema", show(instance)),
                    ));
                }
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Combinators
    // -----------------------------------------------------------------------

    fn combinator(
        &mut self,
        constraint: &Constraint,
        instance: &Value,
        location: &Location<'_>,
        path: &str,
        out: &mut Vec<Violation>,
    ) {
        match constraint {
            Constraint::AllOf(branches) => {
                for branch in branches {
                    self.node(*branch, instance, location, out);
                }
            }
            Constraint::AnyOf(branches) => {
                let mut closest: Option<Vec<Violation>> = None;
                for branch in branches {
                    let found = self.attempt(*branch, instance, location);
                    if found.is_empty() {
                        return;
                    }
                    if closest.as_ref().map_or(true, |best| found.len() < best.len()) {
                        closest = Some(found);
                    }
                }
                out.push(
                    Violation::new(
                        ViolationKind::AnyOf,
                        location.to_pointer(),
                        path,
                        format!("{} is not valid under any of the given schemas", show(instance)),
                    )
                    .with_causes(closest.unwrap_or_default()),
                );
            }
            Constraint::OneOf(branches) => self.one_of(branches, instance, location, path, out),
            Constraint::Not(child) => {
                if self.attempt(*child, instance, location).is_empty() {
                    out.push(Violation::new(
                        ViolationKind::Not,
                        location.to_pointer(),
                        path,
                        format!("{} should not be valid under the negated schema", show(instance)),
                    ));
                }
            }
            Constraint::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let branch = if self.attempt(*condition, instance, location).is_empty() {
                    then
                } else {
                    otherwise
                };
                if let Some(branch) = branch {
                    self.node(*branch, instance, location, out);
                }
            }
            _ => {}
        }
    }

    fn one_of(
        &mut self,
        branches: &[NodeId],
        instance: &Value,
        location: &Location<'_>,
        path: &str,
        out: &mut Vec<Violation>,
    ) {
        let mut matched = Vec::new();
        let mut closest: Option<Vec<Violation>> = None;
        for (i, branch) in branches.iter().enumerate() {
            let found = self.attempt(*branch, instance, location);
            if found.is_empty() {
                matched.push(i);
            } else if closest.as_ref().map_or(true, |best| found.len() < best.len()) {
                closest = Some(found);
            }
        }
        match matched.len() {
            1 => {}
            0 => out.push(
                Violation::new(
                    ViolationKind::OneOfNoMatch,
                    location.to_pointer(),
                    path,
                    format!("{} is not valid under any of the given schemas", show(instance)),
                )
                .with_causes(closest.unwrap_or_default()),
            ),
            _ => {
                let indices: Vec<String> = matched.iter().map(usize::to_string).collect();
                out.push(Violation::new(
                    ViolationKind::OneOfMultipleMatch,
                    location.to_pointer(),
                    path,
                    format!(
                        "{} is valid under more than one of the given schemas (branches {})",
                        show(instance),
                        indices.join(", ")
                    ),
                ));
            }
        }
    }

    fn is_false(&self, id: NodeId) -> bool {
        matches!(self.schema.node(id).kind, NodeKind::Bool(false))
    }
}

fn missing<'a>(map: &Map<String, Value>, required: &'a [String], mut report: impl FnMut(&'a str)) {
    for name in required {
        if !map.contains_key(name) {
            report(name);
        }
    }
}

fn type_list(types: &[PrimitiveType]) -> String {
    types
        .iter()
        .map(|ty| format!("\"{}\"", ty.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Leaf assertions: constraints that never recurse into subschemas.
fn assertion(constraint: &Constraint, instance: &Value, location: &Location<'_>, path: &str, out: &mut Vec<Violation>) {
    let mut fail = |kind: ViolationKind, message: String| {
        out.push(Violation::new(kind, location.to_pointer(), path, message));
    };
    let shown = || show(instance);

    match (constraint, instance) {
        (Constraint::Type(types), _) => {
            if !types.iter().any(|ty| ty.matches(instance)) {
                fail(ViolationKind::Type, format!("{} is not of type {}", shown(), type_list(types)));
            }
        }
        (Constraint::Enum(options), _) => {
            if !options.iter().any(|option| value::equal(option, instance)) {
                let options: Vec<String> = options.iter().map(show).collect();
                fail(
                    ViolationKind::Enum,
                    format!("{} is not one of [{}]", shown(), options.join(", ")),
                );
            }
        }
        (Constraint::Const(expected), _) => {
            if !value::equal(expected, instance) {
                fail(
                    ViolationKind::Const,
                    format!("{} is not equal to the constant {}", shown(), show(expected)),
                );
            }
        }

        // Objects
        (Constraint::Required(required), Value::Object(map)) => {
            missing(map, required, |name| {
                fail(ViolationKind::Required, format!("\"{name}\" is a required property"))
            });
        }
        (Constraint::MinProperties(min), Value::Object(map)) => {
            if (map.len() as u64) < *min {
                fail(
                    ViolationKind::MinProperties,
                    format!("{} has fewer than {min} properties", shown()),
                );
            }
        }
        (Constraint::MaxProperties(max), Value::Object(map)) => {
            if map.len() as u64 > *max {
                fail(
                    ViolationKind::MaxProperties,
                    format!("{} has more than {max} properties", shown()),
                );
            }
        }

        // Arrays
        (Constraint::MinItems(min), Value::Array(items)) => {
            if (items.len() as u64) < *min {
                fail(ViolationKind::MinItems, format!("{} has fewer than {min} items", shown()));
            }
        }
        (Constraint::MaxItems(max), Value::Array(items)) => {
            if items.len() as u64 > *max {
                fail(ViolationKind::MaxItems, format!("{} has more than {max} items", shown()));
            }
        }
        (Constraint::UniqueItems, Value::Array(items)) => {
            if !value::all_unique(items) {
                fail(ViolationKind::UniqueItems, format!("{} has non-unique elements", shown()));
            }
        }

        // Numbers
        (Constraint::Minimum(limit), Value::Number(n)) => {
            if value::compare(n, limit) == Some(std::cmp::Ordering::Less) {
                fail(ViolationKind::Minimum, format!("{n} is less than the minimum of {limit}"));
            }
        }
        (Constraint::Maximum(limit), Value::Number(n)) => {
            if value::compare(n, limit) == Some(std::cmp::Ordering::Greater) {
                fail(ViolationKind::Maximum, format!("{n} is greater than the maximum of {limit}"));
            }
        }
        (Constraint::ExclusiveMinimum(limit), Value::Number(n)) => {
            if value::compare(n, limit) != Some(std::cmp::Ordering::Greater) {
                fail(
                    ViolationKind::ExclusiveMinimum,
                    format!("{n} is less than or equal to the exclusive minimum of {limit}"),
                );
            }
        }
        (Constraint::ExclusiveMaximum(limit), Value::Number(n)) => {
            if value::compare(n, limit) != Some(std::cmp::Ordering::Less) {
                fail(
                    ViolationKind::ExclusiveMaximum,
                    format!("{n} is greater than or equal to the exclusive maximum of {limit}"),
                );
            }
        }
        (Constraint::MultipleOf(divisor), Value::Number(n)) => {
            if !value::is_multiple_of(n, divisor) {
                fail(ViolationKind::MultipleOf, format!("{n} is not a multiple of {divisor}"));
            }
        }

        // Strings
        (Constraint::MinLength(min), Value::String(s)) => {
            if (s.chars().count() as u64) < *min {
                fail(
                    ViolationKind::MinLength,
                    format!("{} is shorter than {min} characters", shown()),
                );
            }
        }
        (Constraint::MaxLength(max), Value::String(s)) => {
            if s.chars().count() as u64 > *max {
                fail(
                    ViolationKind::MaxLength,
                    format!("{} is longer than {max} characters", shown()),
                );
            }
        }
        (Constraint::Pattern(regex), Value::String(s)) => {
            if !regex.is_match(s) {
                fail(
                    ViolationKind::Pattern,
                    format!("{} does not match \"{}\"", shown(), regex.as_str()),
                );
            }
        }
        (Constraint::Format(format), Value::String(s)) => {
            if !format.check(s) {
                fail(
                    ViolationKind::Format,
                    format!("{} is not a \"{}\"", shown(), format.name()),
                );
            }
        }

        // Applicators are handled by the evaluator; anything else does not
        // apply to this instance type.
        _ => {}
    }
}
