//! Familiar Validator
//!
//! Declarative validation of JSON data. A schema describes the expected
//! shape of a value; validating a value reports every violation at once,
//! each located by a JSONPath-style locator, instead of stopping at the
//! first one.
//!
//! ## Features
//!
//! - **Schema checking**: schema documents are validated before use
//! - **Complete reports**: sibling checks keep running after a failure
//! - **oneOf resolution**: alternatives are tried in order, with backtracking
//! - **Extensible**: named string formats and custom keyword validations
//! - **Named schemas**: register once, validate by name
//!
//! ## Example
//!
//! ```
//! use familiar_validator::Validator;
//! use serde_json::json;
//!
//! let mut validator = Validator::new();
//! let errors = validator.register_schema("user", &json!({
//!     "kind": "object",
//!     "properties": {
//!         "name": { "kind": "string", "required": true },
//!         "age": { "kind": "integer", "minimum": 0 }
//!     }
//! }));
//! assert!(errors.is_empty());
//!
//! let errors = validator.validate("user", &json!({ "age": -1 }));
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors[0].pointer(), "$['name']");
//! assert_eq!(errors[1].locator, "$['age']");
//! ```

pub mod config;
pub mod custom;
pub mod error;
pub mod format;
pub mod instance;
pub mod path;
pub mod report;
pub mod schema;
pub mod store;
pub mod validator;

pub use config::ValidatorConfig;
pub use custom::CustomValidations;
pub use error::{Result, ValidatorError};
pub use format::{FormatChecker, FormatRegistry};
pub use instance::InstanceValidator;
pub use path::PathSegment;
pub use report::{ErrorRecord, ErrorSink};
pub use schema::{Kind, Schema, SchemaChecker, SchemaNode};
pub use store::SchemaStore;
pub use validator::{LoadSummary, SchemaRef, Validator};
