//! Instance validation tests
//!
//! End-to-end checks through the `Validator` facade.

use familiar_validator::{path, ErrorRecord, PathSegment, Validator};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

fn fixture(name: &str) -> Value {
    let content = match name {
        "contact" => include_str!("fixtures/contact.json"),
        "nested_one_of" => include_str!("fixtures/nested_one_of.json"),
        other => panic!("unknown fixture {}", other),
    };
    serde_json::from_str(content).unwrap()
}

fn pointers(errors: &[ErrorRecord]) -> Vec<String> {
    errors.iter().map(ErrorRecord::pointer).collect()
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn test_string_kind() {
    let validator = Validator::new();
    assert!(validator.validate(&json!({ "kind": "string" }), &json!("x")).is_empty());

    let errors = validator.validate(&json!({ "kind": "string" }), &json!(1));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].locator, "$");
}

#[test]
fn test_integer_bounds_inclusive() {
    let validator = Validator::new();
    let schema = json!({ "kind": "integer", "minimum": 4, "maximum": 4 });
    assert!(validator.validate(&schema, &json!(4)).is_empty());
    assert_eq!(validator.validate(&schema, &json!(5)).len(), 1);
}

#[test]
fn test_boolean_kind() {
    let validator = Validator::new();
    assert!(validator.validate(&json!("boolean"), &json!(false)).is_empty());
    assert_eq!(validator.validate(&json!("boolean"), &json!("false")).len(), 1);
    assert_eq!(validator.validate(&json!("boolean"), &Value::Null)[0].message, "must not be null");
}

#[test]
fn test_formats_through_schema() {
    let validator = Validator::new();
    let cases = [
        ("date-time", "2013-05-01T12:30:00Z", "2013-05-01 12:30:00"),
        ("date", "2013-05-01", "2013/05/01"),
        ("email", "someone@example.com", "someone@"),
        ("ip-address", "192.168.0.1", "256.0.0.1"),
        ("ipv6", "::1", "::g"),
        ("color", "#ff0000", "#ff00"),
        ("uri", "http://example.com/path?q=1", "not a uri"),
    ];
    for (format, good, bad) in cases {
        let schema = json!({ "kind": "string", "format": format });
        assert!(
            validator.validate(&schema, &json!(good)).is_empty(),
            "{} should accept {}",
            format,
            good
        );
        let errors = validator.validate(&schema, &json!(bad));
        assert_eq!(errors.len(), 1, "{} should reject {}", format, bad);
        assert_eq!(errors[0].message, format!("must match against the format [{}]", format));
    }
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_required_property() {
    let validator = Validator::new();
    let errors = validator.validate(
        &json!({ "kind": "object", "properties": { "a": { "kind": "string", "required": true } } }),
        &json!({}),
    );
    assert_eq!(errors, vec![ErrorRecord::new("$", "a", "property is required", Value::Null)]);
}

#[test]
fn test_additional_properties_as_schema() {
    let validator = Validator::new();
    let schema = json!({
        "kind": "object",
        "properties": {},
        "additionalProperties": { "kind": "string" }
    });
    assert!(validator.validate(&schema, &json!({ "x": "ok" })).is_empty());
    assert_eq!(
        validator.validate(&schema, &json!({ "x": 1 })),
        vec![ErrorRecord::new(
            "$",
            "x",
            "undefined property in schema and not valid against additionalProperties",
            json!(1)
        )]
    );
}

#[test]
fn test_additional_properties_flags() {
    let validator = Validator::new();
    let instance = json!({ "prop1": "value", "prop2": "value" });

    let closed = json!({ "kind": "object", "properties": { "prop1": "string" } });
    assert_eq!(pointers(&validator.validate(&closed, &instance)), vec!["$['prop2']"]);

    let open = json!({
        "kind": "object",
        "properties": { "prop1": "string" },
        "additionalProperties": true
    });
    assert!(validator.validate(&open, &instance).is_empty());
}

#[test]
fn test_object_rejects_non_objects() {
    let validator = Validator::new();
    for value in [json!("1"), json!([]), json!(1), Value::Null] {
        assert_eq!(validator.validate(&json!("object"), &value).len(), 1, "{}", value);
    }
}

#[test]
fn test_contact_reports_everything_at_once() {
    let validator = Validator::new();
    let errors = validator.validate(
        &fixture("contact"),
        &json!({
            "email": "nobody",
            "age": 200,
            "tags": ["a", 2],
            "address": { "zip": "1234", "country": "NL" },
            "nickname": "x"
        }),
    );
    assert_eq!(
        pointers(&errors),
        vec![
            "$['name']",
            "$['email']",
            "$['age']",
            "$['tags'][1]",
            "$['address']['zip']",
            "$['nickname']",
        ]
    );
    assert_eq!(errors[2].message, "must be less than or equal to [150]");
}

#[test]
fn test_nested_keys_are_escaped() {
    let validator = Validator::new();
    let schema = json!({
        "kind": "object",
        "properties": { "it's": { "kind": "object", "properties": { "a\\b": "integer" } } }
    });
    let errors = validator.validate(&schema, &json!({ "it's": { "a\\b": "one" } }));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].locator, "$['it\\'s']['a\\\\b']");
    assert_eq!(
        path::parse(&errors[0].locator).unwrap(),
        vec![PathSegment::Key("it's".to_string()), PathSegment::Key("a\\b".to_string())]
    );
}

// =============================================================================
// oneOf
// =============================================================================

fn exclusive_alternatives() -> Value {
    json!({
        "kind": "object",
        "oneOf": [
            { "kind": "object", "properties": { "prop1": { "kind": "string", "required": true } } },
            { "kind": "object", "properties": { "prop2": { "kind": "string", "required": true } } }
        ]
    })
}

#[test]
fn test_one_of_first_match_wins() {
    let validator = Validator::new();
    assert!(validator.validate(&exclusive_alternatives(), &json!({ "prop2": "test" })).is_empty());
}

#[test]
fn test_one_of_concatenates_all_branches() {
    let validator = Validator::new();
    let errors = validator.validate(&exclusive_alternatives(), &json!({ "prop3": "test" }));
    let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "property is required",
            "undefined property in schema",
            "property is required",
            "undefined property in schema",
        ]
    );
}

#[test]
fn test_nested_one_of() {
    let validator = Validator::new();
    let schema = fixture("nested_one_of");
    assert!(validator.validate_schema(&schema).is_empty());

    let accepted = [
        json!({ "prop1": "text1", "prop2": { "prop1": "prop1" } }),
        json!({ "prop1": "text2", "prop2": { "prop2": "prop2" } }),
        json!({ "prop1": "text3", "prop3": { "prop1": 100 } }),
    ];
    for instance in &accepted {
        assert!(validator.validate(&schema, instance).is_empty(), "{}", instance);
    }

    let rejected = [
        json!({ "prop1": "text2", "prop2": { "prop2": 100 } }),
        json!({ "prop1": "text5", "prop3": { "prop1": 100 } }),
    ];
    for instance in &rejected {
        assert!(!validator.validate(&schema, instance).is_empty(), "{}", instance);
    }
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn test_untyped_array_accepts_anything() {
    let validator = Validator::new();
    assert!(validator.validate(&json!("array"), &json!(["string", 1, true, null])).is_empty());
    assert_eq!(validator.validate(&json!("array"), &json!({})).len(), 1);
}

#[test]
fn test_items_alternatives() {
    let validator = Validator::new();
    let schema = json!({ "kind": "array", "items": [{ "kind": "string" }, { "kind": "integer" }] });
    assert!(validator.validate(&schema, &json!(["string1", 2])).is_empty());

    let errors = validator.validate(&schema, &json!(["string1", 2.5]));
    assert_eq!(
        errors,
        vec![ErrorRecord::new("$[1]", "", "must match with schema of type [array]", json!(2.5))]
    );
}

#[test]
fn test_item_bounds() {
    let validator = Validator::new();
    let at_least = json!({ "kind": "array", "minItems": 4 });
    let at_most = json!({ "kind": "array", "maxItems": 4 });
    assert!(validator.validate(&at_least, &json!([1, 2, 3, 4])).is_empty());
    assert_eq!(
        validator.validate(&at_least, &json!([1, 2, 3]))[0].message,
        "need at least [4] items"
    );
    assert_eq!(
        validator.validate(&at_most, &json!([1, 2, 3, 4, 5]))[0].message,
        "need at most [4] items"
    );
}

// =============================================================================
// Custom validations
// =============================================================================

fn with_error_if_contains() -> Validator {
    let mut validator = Validator::new();
    validator.add_validation("errorIfContains", |schema, instance| {
        let needle = schema.get("errorIfContains")?.as_str()?;
        instance
            .as_str()
            .filter(|s| s.contains(needle))
            .map(|_| "error thrown by custom validation".to_string())
    });
    validator
}

#[test]
fn test_custom_validation_detects_error() {
    let validator = with_error_if_contains();
    let schema = json!({
        "kind": "object",
        "properties": {
            "prop1": { "kind": "string" },
            "prop2": { "kind": "string", "errorIfContains": "error" }
        }
    });

    let errors = validator.validate(
        &schema,
        &json!({ "prop1": "prop1", "prop2": "if value contains error, it will throw an error." }),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].locator, "$['prop2']");
    assert_eq!(errors[0].message, "error thrown by custom validation");

    assert!(validator
        .validate(&schema, &json!({ "prop1": "prop1", "prop2": "it will succeed." }))
        .is_empty());
}

#[test]
fn test_custom_validations_run_in_registration_order() {
    let mut validator = Validator::new();
    validator.add_validation("second", |_, _| Some("second".to_string()));
    validator.add_validation("first", |_, _| Some("first".to_string()));
    let errors = validator.validate(&json!({ "kind": "any", "first": 1, "second": 2 }), &json!(0));
    let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["second", "first"]);
}

// =============================================================================
// Properties
// =============================================================================

fn instance() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_validation_is_idempotent(value in instance()) {
        let validator = Validator::new();
        let schema = fixture("contact");
        prop_assert_eq!(validator.validate(&schema, &value), validator.validate(&schema, &value));
    }

    #[test]
    fn prop_locators_parse(value in instance()) {
        let validator = Validator::new();
        let schema = json!({
            "kind": "object",
            "additionalProperties": { "kind": "array", "items": "integer" }
        });
        for error in validator.validate(&schema, &value) {
            prop_assert!(path::parse(&error.locator).is_ok(), "{}", error.locator);
            prop_assert!(path::parse(&error.pointer()).is_ok(), "{}", error.pointer());
        }
    }
}
