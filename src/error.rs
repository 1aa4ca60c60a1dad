//! Error types for the validator
//!
//! Validation outcomes are never errors: both engines return lists of
//! [`ErrorRecord`](crate::report::ErrorRecord). The variants below cover the
//! surrounding plumbing (locator parsing, configuration, schema files).

use std::path::PathBuf;

use thiserror::Error;

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Validator errors
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Invalid locator '{locator}' at offset {offset}")]
    InvalidLocator { locator: String, offset: usize },

    #[error("Invalid pattern for format '{name}': {source}")]
    InvalidFormatPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Schema file {path:?} could not be parsed: {source}")]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
