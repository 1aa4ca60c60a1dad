//! Schema meta-validation
//!
//! Confirms that a schema document is well formed for its declared kinds,
//! building the typed node tree in the same pass. A node is only built when
//! its whole subtree is free of schema errors.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::keyword::*;
use super::{
    AdditionalProperties, ArrayRules, Bound, Constraints, Items, Kind, NumberRules, ObjectRules,
    SchemaNode, StringRules,
};
use crate::format::FormatRegistry;
use crate::path::{self, ROOT};
use crate::report::{type_name, ErrorRecord, ErrorSink};

/// Outcome of checking a schema document
#[derive(Debug)]
pub struct Checked {
    /// The compiled root, present only when `errors` is empty
    pub node: Option<SchemaNode>,
    pub errors: Vec<ErrorRecord>,
}

/// Checks schema documents against the rules of their declared kinds
#[derive(Debug, Clone)]
pub struct SchemaChecker<'a> {
    formats: &'a FormatRegistry,
    reject_unsupported: bool,
}

impl<'a> SchemaChecker<'a> {
    pub fn new(formats: &'a FormatRegistry) -> Self {
        Self {
            formats,
            reject_unsupported: true,
        }
    }

    /// Whether keywords listed in [`UNSUPPORTED`] are reported as errors
    pub fn reject_unsupported(mut self, reject: bool) -> Self {
        self.reject_unsupported = reject;
        self
    }

    /// Check a schema document and return every problem found
    pub fn validate(&self, document: &Value) -> Vec<ErrorRecord> {
        self.check(document).errors
    }

    /// Check a schema document, compiling it when well formed
    pub fn check(&self, document: &Value) -> Checked {
        let mut errors = ErrorSink::new();
        let node = self.node(document, ROOT, &mut errors);
        Checked {
            node: node.filter(|_| errors.is_empty()),
            errors: errors.into_vec(),
        }
    }

    fn node(&self, value: &Value, path: &str, errors: &mut ErrorSink) -> Option<SchemaNode> {
        let expanded;
        let map = match value {
            Value::String(kind) => {
                expanded = shorthand(kind);
                &expanded
            }
            Value::Object(map) => map,
            other => {
                errors.push(
                    path,
                    "",
                    "must be of type [object] and not null",
                    json!(type_name(other)),
                );
                return None;
            }
        };

        let Some(declared) = map.get(KIND) else {
            errors.push(path, "", format!("must contain [{}] property", KIND), Value::Null);
            return None;
        };

        let before = errors.len();
        let required = self.boolean(map, REQUIRED, path, errors).unwrap_or(false);

        if self.reject_unsupported {
            for keyword in UNSUPPORTED {
                if let Some(v) = map.get(*keyword) {
                    errors.push(path, keyword, "unsupported keyword", v.clone());
                }
            }
        }

        let constraints = match declared.as_str().and_then(Kind::parse) {
            Some(Kind::String) => self.string_rules(map, path, errors).map(Constraints::String),
            Some(Kind::Number) => {
                self.number_rules(map, path, false, errors).map(Constraints::Number)
            }
            Some(Kind::Integer) => {
                self.number_rules(map, path, true, errors).map(Constraints::Integer)
            }
            Some(Kind::Boolean) => Some(Constraints::Boolean),
            Some(Kind::Null) => Some(Constraints::Null),
            Some(Kind::Any) => Some(Constraints::Any),
            Some(Kind::Object) => self.object_rules(map, path, errors).map(Constraints::Object),
            Some(Kind::Array) => self.array_rules(map, path, errors).map(Constraints::Array),
            None => {
                let legal: Vec<_> = Kind::ALL.iter().map(Kind::as_str).collect();
                errors.push(
                    path,
                    KIND,
                    format!("must be one of [{}]", legal.join(" | ")),
                    declared.clone(),
                );
                None
            }
        };

        if errors.len() > before {
            return None;
        }
        Some(SchemaNode::new(required, constraints?, own_keys(map)))
    }

    fn string_rules(
        &self,
        map: &Map<String, Value>,
        path: &str,
        errors: &mut ErrorSink,
    ) -> Option<StringRules> {
        let min_length = self.count(map, MIN_LENGTH, path, errors);
        let max_length = self.count(map, MAX_LENGTH, path, errors);

        let pattern = map.get(PATTERN).and_then(|v| match v.as_str() {
            Some(source) => match Regex::new(source) {
                Ok(re) => Some(re),
                Err(_) => {
                    errors.push(
                        path,
                        PATTERN,
                        "must be valid regular expression pattern",
                        v.clone(),
                    );
                    None
                }
            },
            None => {
                errors.push(path, PATTERN, "must be of type [string]", v.clone());
                None
            }
        });

        let format = map.get(FORMAT).and_then(|v| match v.as_str() {
            Some(name) if self.formats.contains(name) => Some(name.to_string()),
            _ => {
                let names: Vec<_> = self.formats.names().collect();
                errors.push(
                    path,
                    FORMAT,
                    format!("must be one of [{}]", names.join(" | ")),
                    v.clone(),
                );
                None
            }
        });

        let allowed = self.enumeration(
            map,
            path,
            errors,
            |v| v.as_str().map(str::to_string),
            "must be of type [string]",
        );

        Some(StringRules {
            min_length,
            max_length,
            pattern,
            format,
            allowed,
        })
    }

    fn number_rules(
        &self,
        map: &Map<String, Value>,
        path: &str,
        integral: bool,
        errors: &mut ErrorSink,
    ) -> Option<NumberRules> {
        let minimum = self.bound(map, MINIMUM, EXCLUSIVE_MINIMUM, integral, path, errors);
        let maximum = self.bound(map, MAXIMUM, EXCLUSIVE_MAXIMUM, integral, path, errors);

        let allowed = if integral {
            self.enumeration(
                map,
                path,
                errors,
                |v| v.as_f64().filter(|n| n.fract() == 0.0),
                NOT_INTEGRAL,
            )
        } else {
            self.enumeration(map, path, errors, Value::as_f64, "must be of type [number]")
        };

        Some(NumberRules {
            minimum,
            maximum,
            allowed,
        })
    }

    fn object_rules(
        &self,
        map: &Map<String, Value>,
        path: &str,
        errors: &mut ErrorSink,
    ) -> Option<ObjectRules> {
        let additional = match map.get(ADDITIONAL_PROPERTIES) {
            None | Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
            Some(Value::Bool(true)) => AdditionalProperties::Allowed,
            Some(schema) => {
                let node = self.node(schema, &path::with_key(path, ADDITIONAL_PROPERTIES), errors);
                node.map(|n| AdditionalProperties::Schema(Box::new(n)))
                    .unwrap_or_default()
            }
        };

        let mut properties = IndexMap::new();
        match map.get(PROPERTIES) {
            None => {}
            Some(Value::Object(declared)) => {
                let base = path::with_key(path, PROPERTIES);
                for (name, schema) in declared {
                    if let Some(node) = self.node(schema, &path::with_key(&base, name), errors) {
                        properties.insert(name.clone(), node);
                    }
                }
            }
            Some(other) => {
                errors.push(path, PROPERTIES, "must be of type [object]", json!(type_name(other)));
            }
        }

        let one_of = match map.get(ONE_OF) {
            None => None,
            Some(Value::Array(alternatives)) => {
                Some(self.node_list(alternatives, &path::with_key(path, ONE_OF), errors))
            }
            Some(other) => {
                errors.push(path, ONE_OF, "must be of type [array]", json!(type_name(other)));
                None
            }
        };

        Some(ObjectRules {
            properties,
            additional,
            one_of,
        })
    }

    fn array_rules(
        &self,
        map: &Map<String, Value>,
        path: &str,
        errors: &mut ErrorSink,
    ) -> Option<ArrayRules> {
        let items = match map.get(ITEMS) {
            None => None,
            Some(Value::Array(alternatives)) => Some(Items::Alternatives(self.node_list(
                alternatives,
                &path::with_key(path, ITEMS),
                errors,
            ))),
            Some(schema) => self
                .node(schema, &path::with_key(path, ITEMS), errors)
                .map(|n| Items::Single(Box::new(n))),
        };

        let min_items = self.count(map, MIN_ITEMS, path, errors);
        let max_items = self.count(map, MAX_ITEMS, path, errors);

        Some(ArrayRules {
            items,
            min_items,
            max_items,
        })
    }

    /// Check every element, keeping the ones that compiled
    fn node_list(&self, values: &[Value], path: &str, errors: &mut ErrorSink) -> Vec<SchemaNode> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| self.node(v, &path::with_index(path, i), errors))
            .collect()
    }

    fn boolean(
        &self,
        map: &Map<String, Value>,
        key: &str,
        path: &str,
        errors: &mut ErrorSink,
    ) -> Option<bool> {
        let v = map.get(key)?;
        if v.as_bool().is_none() {
            errors.push(path, key, "must be of type [boolean]", json!(type_name(v)));
        }
        v.as_bool()
    }

    /// A non-negative integer
    fn count(
        &self,
        map: &Map<String, Value>,
        key: &str,
        path: &str,
        errors: &mut ErrorSink,
    ) -> Option<u64> {
        let v = map.get(key)?;
        match v.as_f64() {
            Some(n) if n.fract() == 0.0 && n >= 0.0 => Some(n as u64),
            _ => {
                errors.push(
                    path,
                    key,
                    format!("{} greater than or equal to 0", NOT_INTEGRAL),
                    v.clone(),
                );
                None
            }
        }
    }

    fn bound(
        &self,
        map: &Map<String, Value>,
        key: &str,
        exclusive_key: &str,
        integral: bool,
        path: &str,
        errors: &mut ErrorSink,
    ) -> Option<Bound> {
        let v = map.get(key)?;
        let limit = match v.as_f64() {
            Some(n) if !integral || n.fract() == 0.0 => n,
            _ => {
                let message = if integral { NOT_INTEGRAL } else { "must be of type [number]" };
                errors.push(path, key, message, v.clone());
                return None;
            }
        };
        let exclusive = self.boolean(map, exclusive_key, path, errors).unwrap_or(false);
        Some(Bound { limit, exclusive })
    }

    /// `enum` must be an array whose elements all convert with `element`
    fn enumeration<T>(
        &self,
        map: &Map<String, Value>,
        path: &str,
        errors: &mut ErrorSink,
        element: impl Fn(&Value) -> Option<T>,
        message: &str,
    ) -> Option<Vec<T>> {
        let v = map.get(ENUM)?;
        let Some(values) = v.as_array() else {
            errors.push(path, ENUM, "must be of type [array]", json!(type_name(v)));
            return None;
        };

        let base = path::with_key(path, ENUM);
        let mut allowed = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            match element(value) {
                Some(item) => allowed.push(item),
                None => errors.push(&path::with_index(&base, i), "", message, value.clone()),
            }
        }
        Some(allowed)
    }
}

const NOT_INTEGRAL: &str = "must be of type [number] with no digits";

/// The node's keys minus its child schemas, which live in the compiled tree
fn own_keys(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !CHILDREN.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn shorthand(kind: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(KIND.to_string(), Value::String(kind.to_string()));
    map
}
