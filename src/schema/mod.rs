//! Schema documents and their compiled form
//!
//! A schema document is JSON. Every node declares a `kind` from a closed set
//! and carries constraints that depend on that kind:
//!
//! ```json
//! {
//!   "kind": "object",
//!   "properties": {
//!     "name": { "kind": "string", "required": true, "maxLength": 64 },
//!     "tags": { "kind": "array", "items": "string" }
//!   },
//!   "additionalProperties": false
//! }
//! ```
//!
//! A bare string (`"string"` above) is shorthand for `{ "kind": "string" }`.
//!
//! [`Schema::compile`] checks a document with the [`SchemaChecker`] and, when
//! it is well formed, produces a typed [`SchemaNode`] tree.

pub mod meta;

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format::FormatRegistry;
use crate::report::ErrorRecord;

pub use meta::{Checked, SchemaChecker};

/// Schema keywords
pub mod keyword {
    pub const KIND: &str = "kind";
    pub const REQUIRED: &str = "required";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const PATTERN: &str = "pattern";
    pub const FORMAT: &str = "format";
    pub const ENUM: &str = "enum";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const EXCLUSIVE_MINIMUM: &str = "exclusiveMinimum";
    pub const EXCLUSIVE_MAXIMUM: &str = "exclusiveMaximum";
    pub const PROPERTIES: &str = "properties";
    pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
    pub const ONE_OF: &str = "oneOf";
    pub const ITEMS: &str = "items";
    pub const MIN_ITEMS: &str = "minItems";
    pub const MAX_ITEMS: &str = "maxItems";

    /// Keywords holding child schemas
    pub const CHILDREN: &[&str] = &[PROPERTIES, ADDITIONAL_PROPERTIES, ONE_OF, ITEMS];

    /// Keywords of related schema languages that are deliberately not supported
    pub const UNSUPPORTED: &[&str] = &[
        "uniqueItems",
        "divisibleBy",
        "dependencies",
        "$ref",
        "extends",
        "patternProperties",
        "additionalItems",
        "disallow",
    ];
}

/// The declared kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Any,
    Object,
    Array,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::String,
        Kind::Number,
        Kind::Integer,
        Kind::Boolean,
        Kind::Null,
        Kind::Any,
        Kind::Object,
        Kind::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Integer => "integer",
            Kind::Boolean => "boolean",
            Kind::Null => "null",
            Kind::Any => "any",
            Kind::Object => "object",
            Kind::Array => "array",
        }
    }

    pub fn parse(name: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed schema node
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Whether the property holding this node must be present in its parent
    pub required: bool,
    pub constraints: Constraints,
    /// The node as written (shorthand expanded) without its child schemas,
    /// for custom validations
    source: Map<String, Value>,
}

impl SchemaNode {
    pub(crate) fn new(
        required: bool,
        constraints: Constraints,
        source: Map<String, Value>,
    ) -> Self {
        Self {
            required,
            constraints,
            source,
        }
    }

    pub fn kind(&self) -> Kind {
        match &self.constraints {
            Constraints::String(_) => Kind::String,
            Constraints::Number(_) => Kind::Number,
            Constraints::Integer(_) => Kind::Integer,
            Constraints::Boolean => Kind::Boolean,
            Constraints::Null => Kind::Null,
            Constraints::Any => Kind::Any,
            Constraints::Object(_) => Kind::Object,
            Constraints::Array(_) => Kind::Array,
        }
    }

    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }
}

/// Kind-specific constraints
#[derive(Debug, Clone)]
pub enum Constraints {
    String(StringRules),
    Number(NumberRules),
    Integer(NumberRules),
    Boolean,
    Null,
    Any,
    Object(ObjectRules),
    Array(ArrayRules),
}

#[derive(Debug, Clone, Default)]
pub struct StringRules {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<Regex>,
    /// Looked up in the format registry at validation time
    pub format: Option<String>,
    pub allowed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberRules {
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub allowed: Option<Vec<f64>>,
}

/// A numeric limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub limit: f64,
    pub exclusive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectRules {
    pub properties: IndexMap<String, SchemaNode>,
    pub additional: AdditionalProperties,
    pub one_of: Option<Vec<SchemaNode>>,
}

/// What to do with properties not declared in `properties`
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    /// Absent or `false`
    #[default]
    Forbidden,
    /// `true`
    Allowed,
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Clone, Default)]
pub struct ArrayRules {
    pub items: Option<Items>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum Items {
    /// Every element must match this node
    Single(Box<SchemaNode>),
    /// Every element must match at least one of these nodes
    Alternatives(Vec<SchemaNode>),
}

/// A compiled, well-formed schema
#[derive(Debug, Clone)]
pub struct Schema {
    root: SchemaNode,
    document: Value,
}

impl Schema {
    /// Check `document` and compile it; the error list is never empty on failure
    pub fn compile(document: &Value, formats: &FormatRegistry) -> Result<Self, Vec<ErrorRecord>> {
        Self::compile_with(document, &SchemaChecker::new(formats))
    }

    pub fn compile_with(
        document: &Value,
        checker: &SchemaChecker<'_>,
    ) -> Result<Self, Vec<ErrorRecord>> {
        let checked = checker.check(document);
        match checked.node {
            Some(root) if checked.errors.is_empty() => Ok(Self {
                root,
                document: document.clone(),
            }),
            _ => Err(checked.errors),
        }
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// The document this schema was compiled from
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn kind(&self) -> Kind {
        self.root.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(Kind::parse("map"), None);
    }

    #[test]
    fn test_compile_object() {
        let formats = FormatRegistry::builtin();
        let schema = Schema::compile(
            &json!({
                "kind": "object",
                "properties": {
                    "name": { "kind": "string", "required": true, "pattern": "^[a-z]+$" },
                    "tags": { "kind": "array", "items": "string", "maxItems": 3 }
                },
                "additionalProperties": {
                    "kind": "integer",
                    "minimum": 0,
                    "exclusiveMinimum": true
                }
            }),
            &formats,
        )
        .unwrap();

        let Constraints::Object(rules) = &schema.root().constraints else {
            panic!("expected object constraints");
        };
        let names: Vec<_> = rules.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "tags"]);
        assert!(rules.properties["name"].required);
        assert!(!rules.properties["tags"].required);
        match &rules.additional {
            AdditionalProperties::Schema(node) => match &node.constraints {
                Constraints::Integer(rules) => {
                    assert_eq!(rules.minimum, Some(Bound { limit: 0.0, exclusive: true }));
                }
                other => panic!("expected integer, got {:?}", other),
            },
            other => panic!("expected schema, got {:?}", other),
        }
    }

    #[test]
    fn test_shorthand_keeps_source() {
        let formats = FormatRegistry::builtin();
        let schema = Schema::compile(&json!("boolean"), &formats).unwrap();
        assert_eq!(schema.kind(), Kind::Boolean);
        assert_eq!(schema.root().source().get("kind"), Some(&json!("boolean")));
    }

    #[test]
    fn test_compile_failure_reports_errors() {
        let formats = FormatRegistry::builtin();
        let document = json!({ "kind": "string", "minLength": -1 });
        let errors = Schema::compile(&document, &formats).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "minLength");
    }
}
