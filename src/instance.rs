//! Instance validation
//!
//! Walks a compiled schema and a JSON value in lock-step and reports every
//! violation, never stopping at the first one. Each recursive call returns
//! its own [`ErrorSink`]; branches that are only tried (`oneOf`
//! alternatives, `additionalProperties` schemas, positional `items`) keep
//! their errors local and either drop them or merge them whole.

use serde_json::{json, Map, Value};
use tracing::trace;

use crate::custom::CustomValidations;
use crate::format::FormatRegistry;
use crate::path::{self, ROOT};
use crate::report::{type_name, ErrorRecord, ErrorSink};
use crate::schema::{
    AdditionalProperties, ArrayRules, Bound, Constraints, Items, NumberRules, ObjectRules, Schema,
    SchemaNode, StringRules,
};

/// Validates values against compiled schemas
#[derive(Debug, Clone, Copy)]
pub struct InstanceValidator<'a> {
    formats: &'a FormatRegistry,
    custom: &'a CustomValidations,
}

impl<'a> InstanceValidator<'a> {
    pub fn new(formats: &'a FormatRegistry, custom: &'a CustomValidations) -> Self {
        Self { formats, custom }
    }

    pub fn validate(&self, schema: &Schema, value: &Value) -> Vec<ErrorRecord> {
        self.validate_node(schema.root(), value)
    }

    pub fn validate_node(&self, node: &SchemaNode, value: &Value) -> Vec<ErrorRecord> {
        self.visit(node, value, ROOT).into_vec()
    }

    fn visit(&self, node: &SchemaNode, value: &Value, path: &str) -> ErrorSink {
        let mut errors = ErrorSink::new();

        let nullable = matches!(node.constraints, Constraints::Null | Constraints::Any);
        if value.is_null() && !nullable {
            errors.push(path, "", "must not be null", Value::Null);
            return errors;
        }

        for message in self.custom.run(node.source(), value) {
            errors.push(path, "", message, value.clone());
        }

        match &node.constraints {
            Constraints::String(rules) => self.string(rules, value, path, &mut errors),
            Constraints::Number(rules) => self.number(rules, value, path, false, &mut errors),
            Constraints::Integer(rules) => self.number(rules, value, path, true, &mut errors),
            Constraints::Boolean => {
                if !value.is_boolean() {
                    errors.push(path, "", "must be of type [boolean]", json!(type_name(value)));
                }
            }
            // only the null entry rule applies to either
            Constraints::Null | Constraints::Any => {}
            Constraints::Object(rules) => self.object(rules, value, path, &mut errors),
            Constraints::Array(rules) => self.array(rules, value, path, &mut errors),
        }

        errors
    }

    fn string(&self, rules: &StringRules, value: &Value, path: &str, errors: &mut ErrorSink) {
        let Some(s) = value.as_str() else {
            errors.push(path, "", "must be of type [string]", json!(type_name(value)));
            return;
        };

        let length = s.chars().count() as u64;
        if let Some(min) = rules.min_length {
            if length < min {
                errors.push(
                    path,
                    "",
                    format!("length must be greater than or equal to [{}]", min),
                    value.clone(),
                );
            }
        }
        if let Some(max) = rules.max_length {
            if length > max {
                errors.push(
                    path,
                    "",
                    format!("length must be less than or equal to [{}]", max),
                    value.clone(),
                );
            }
        }

        if let Some(pattern) = &rules.pattern {
            if !pattern.is_match(s) {
                errors.push(
                    path,
                    "",
                    format!("must match against the regular expression [{}]", pattern.as_str()),
                    value.clone(),
                );
            }
        }

        if let Some(format) = &rules.format {
            // a format removed after compilation never matches
            if self.formats.check(format, s) != Some(true) {
                errors.push(
                    path,
                    "",
                    format!("must match against the format [{}]", format),
                    value.clone(),
                );
            }
        }

        if let Some(allowed) = &rules.allowed {
            if !allowed.iter().any(|a| a == s) {
                errors.push(
                    path,
                    "",
                    format!("must be one of [{}]", allowed.join(" | ")),
                    value.clone(),
                );
            }
        }
    }

    fn number(
        &self,
        rules: &NumberRules,
        value: &Value,
        path: &str,
        integral: bool,
        errors: &mut ErrorSink,
    ) {
        let n = match value.as_f64() {
            Some(n) if !integral || n.fract() == 0.0 => n,
            _ => {
                let message = if integral {
                    "must be of type [number] with no digits"
                } else {
                    "must be of type [number]"
                };
                errors.push(path, "", message, json!(type_name(value)));
                return;
            }
        };

        if let Some(Bound { limit, exclusive }) = rules.minimum {
            if exclusive && n <= limit {
                errors.push(path, "", format!("must be greater than [{}]", limit), value.clone());
            } else if !exclusive && n < limit {
                errors.push(
                    path,
                    "",
                    format!("must be greater than or equal to [{}]", limit),
                    value.clone(),
                );
            }
        }
        if let Some(Bound { limit, exclusive }) = rules.maximum {
            if exclusive && n >= limit {
                errors.push(path, "", format!("must be less than [{}]", limit), value.clone());
            } else if !exclusive && n > limit {
                errors.push(
                    path,
                    "",
                    format!("must be less than or equal to [{}]", limit),
                    value.clone(),
                );
            }
        }

        if let Some(allowed) = &rules.allowed {
            if !allowed.iter().any(|a| *a == n) {
                let listed: Vec<_> = allowed.iter().map(f64::to_string).collect();
                errors.push(
                    path,
                    "",
                    format!("must be one of [{}]", listed.join(" | ")),
                    value.clone(),
                );
            }
        }
    }

    fn object(&self, rules: &ObjectRules, value: &Value, path: &str, errors: &mut ErrorSink) {
        let Some(object) = value.as_object() else {
            errors.push(path, "", "must be of type [object]", json!(type_name(value)));
            return;
        };

        if let Some(alternatives) = &rules.one_of {
            errors.append(self.one_of(alternatives, value, path));
            return;
        }

        for (name, child) in &rules.properties {
            if child.required && !object.contains_key(name) {
                errors.push(path, name, "property is required", Value::Null);
            }
        }

        self.members(rules, object, path, errors);
    }

    fn members(
        &self,
        rules: &ObjectRules,
        object: &Map<String, Value>,
        path: &str,
        errors: &mut ErrorSink,
    ) {
        for (name, member) in object {
            let member_path = path::with_key(path, name);

            if let Some(child) = rules.properties.get(name) {
                errors.append(self.visit(child, member, &member_path));
                continue;
            }

            match &rules.additional {
                AdditionalProperties::Allowed => {}
                AdditionalProperties::Forbidden => {
                    errors.push(path, name, "undefined property in schema", member.clone());
                }
                AdditionalProperties::Schema(node) => {
                    if !self.visit(node, member, &member_path).is_empty() {
                        errors.push(
                            path,
                            name,
                            "undefined property in schema and not valid against additionalProperties",
                            member.clone(),
                        );
                    }
                }
            }
        }
    }

    /// The first clean alternative wins; otherwise every alternative's errors
    fn one_of(&self, alternatives: &[SchemaNode], value: &Value, path: &str) -> ErrorSink {
        let mut failures = ErrorSink::new();
        for (i, alternative) in alternatives.iter().enumerate() {
            let branch = self.visit(alternative, value, path);
            if branch.is_empty() {
                trace!(path, alternative = i, "oneOf alternative matched");
                return ErrorSink::new();
            }
            trace!(path, alternative = i, errors = branch.len(), "oneOf alternative failed");
            failures.append(branch);
        }
        failures
    }

    fn array(&self, rules: &ArrayRules, value: &Value, path: &str, errors: &mut ErrorSink) {
        let Some(elements) = value.as_array() else {
            errors.push(path, "", "must be of type [array]", json!(type_name(value)));
            return;
        };

        let count = elements.len() as u64;
        if let Some(min) = rules.min_items {
            if count < min {
                errors.push(path, "", format!("need at least [{}] items", min), json!(count));
            }
        }
        if let Some(max) = rules.max_items {
            if count > max {
                errors.push(path, "", format!("need at most [{}] items", max), json!(count));
            }
        }

        match &rules.items {
            None => {}
            Some(Items::Single(node)) => {
                for (i, element) in elements.iter().enumerate() {
                    errors.append(self.visit(node, element, &path::with_index(path, i)));
                }
            }
            Some(Items::Alternatives(alternatives)) => {
                for (i, element) in elements.iter().enumerate() {
                    let element_path = path::with_index(path, i);
                    let failed = alternatives
                        .iter()
                        .filter(|alt| !self.visit(alt, element, &element_path).is_empty())
                        .count();
                    if failed == alternatives.len() {
                        errors.push(
                            &element_path,
                            "",
                            "must match with schema of type [array]",
                            element.clone(),
                        );
                    }
                }
            }
        }
    }
}
