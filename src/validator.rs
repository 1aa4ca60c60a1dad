//! The validator facade
//!
//! Bundles the format registry, the custom validations and the schema store
//! with the settings that govern them. Reads take `&self` and mutations take
//! `&mut self`, so registration has to finish before a validator is shared
//! across threads.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ValidatorConfig;
use crate::custom::CustomValidations;
use crate::error::{Result, ValidatorError};
use crate::format::{FormatChecker, FormatRegistry};
use crate::instance::InstanceValidator;
use crate::path::ROOT;
use crate::report::ErrorRecord;
use crate::schema::{Schema, SchemaChecker};
use crate::store::SchemaStore;

/// Either a registered schema name or an inline schema document
#[derive(Debug, Clone, Copy)]
pub enum SchemaRef<'a> {
    Named(&'a str),
    Inline(&'a Value),
}

impl<'a> From<&'a str> for SchemaRef<'a> {
    fn from(name: &'a str) -> Self {
        SchemaRef::Named(name)
    }
}

impl<'a> From<&'a String> for SchemaRef<'a> {
    fn from(name: &'a String) -> Self {
        SchemaRef::Named(name)
    }
}

/// A JSON string is the kind shorthand, not a name
impl<'a> From<&'a Value> for SchemaRef<'a> {
    fn from(document: &'a Value) -> Self {
        SchemaRef::Inline(document)
    }
}

/// Outcome of [`Validator::load_schema_dir`]
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Names registered, in walk order
    pub loaded: Vec<String>,
    /// Files whose schema was malformed, with the reasons
    pub rejected: Vec<(PathBuf, Vec<ErrorRecord>)>,
}

#[derive(Debug, Clone)]
pub struct Validator {
    formats: FormatRegistry,
    custom: CustomValidations,
    store: SchemaStore,
    check_schema: bool,
    reject_unsupported: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with the built-in formats and nothing registered
    pub fn new() -> Self {
        Self {
            formats: FormatRegistry::builtin(),
            custom: CustomValidations::new(),
            store: SchemaStore::new(),
            check_schema: true,
            reject_unsupported: true,
        }
    }

    /// Build a validator from configuration, registering configured formats
    /// and loading the configured schema directories
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let mut validator = Self::new();
        validator.check_schema = config.validation.check_schema;
        validator.reject_unsupported = config.validation.reject_unsupported_keywords;

        for (name, pattern) in &config.formats {
            validator.register_format(name.as_str(), FormatChecker::pattern(name, pattern)?);
        }

        for dir in &config.store.schema_dirs {
            let summary = validator.load_schema_dir(dir)?;
            debug!(
                dir = %dir.display(),
                loaded = summary.loaded.len(),
                rejected = summary.rejected.len(),
                "Loaded schema directory"
            );
        }

        Ok(validator)
    }

    fn checker(&self) -> SchemaChecker<'_> {
        SchemaChecker::new(&self.formats).reject_unsupported(self.reject_unsupported)
    }

    fn instances(&self) -> InstanceValidator<'_> {
        InstanceValidator::new(&self.formats, &self.custom)
    }

    /// Check that `document` is a well-formed schema
    pub fn validate_schema(&self, document: &Value) -> Vec<ErrorRecord> {
        self.checker().validate(document)
    }

    pub fn compile(&self, document: &Value) -> std::result::Result<Schema, Vec<ErrorRecord>> {
        Schema::compile_with(document, &self.checker())
    }

    /// Validate `value` against a registered or inline schema
    ///
    /// An unknown name yields a single "not registered" error. A malformed
    /// inline schema yields a single "validation failed" error, or its schema
    /// errors when `check_schema` is off.
    pub fn validate<'s>(
        &self,
        schema: impl Into<SchemaRef<'s>>,
        value: &Value,
    ) -> Vec<ErrorRecord> {
        match schema.into() {
            SchemaRef::Named(name) => match self.store.get(name) {
                Some(schema) => self.validate_compiled(schema, value),
                None => vec![ErrorRecord::new(
                    ROOT,
                    "",
                    "specified schema is not registered",
                    Value::String(name.to_string()),
                )],
            },
            SchemaRef::Inline(document) => match self.compile(document) {
                Ok(schema) => self.validate_compiled(&schema, value),
                Err(_) if self.check_schema => vec![ErrorRecord::new(
                    ROOT,
                    "",
                    "specified schema validation failed",
                    Value::Null,
                )],
                Err(errors) => errors,
            },
        }
    }

    pub fn validate_compiled(&self, schema: &Schema, value: &Value) -> Vec<ErrorRecord> {
        self.instances().validate(schema, value)
    }

    /// Meta-validate `document` and store it under `name` when well formed;
    /// a malformed document leaves any earlier schema of that name in place
    pub fn register_schema(
        &mut self,
        name: impl Into<String>,
        document: &Value,
    ) -> Vec<ErrorRecord> {
        let name = name.into();
        match self.compile(document) {
            Ok(schema) => {
                let replaced = self.store.insert(name.clone(), schema).is_some();
                debug!(name = %name, replaced, "Registered schema");
                Vec::new()
            }
            Err(errors) => {
                debug!(name = %name, errors = errors.len(), "Schema registration rejected");
                errors
            }
        }
    }

    pub fn unregister_schema(&mut self, name: &str) -> bool {
        let removed = self.store.remove(name).is_some();
        if removed {
            debug!(name, "Unregistered schema");
        }
        removed
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.store.get(name)
    }

    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.store.names()
    }

    /// Register or replace the custom validation keyed by `name`
    pub fn add_validation(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&Map<String, Value>, &Value) -> Option<String> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!(name = %name, "Added custom validation");
        self.custom.insert(name, f);
    }

    pub fn remove_validation(&mut self, name: &str) -> bool {
        self.custom.remove(name)
    }

    /// Register or override a named format
    pub fn register_format(&mut self, name: impl Into<String>, checker: FormatChecker) {
        let name = name.into();
        let replaced = self.formats.register(name.clone(), checker).is_some();
        debug!(name = %name, replaced, "Registered format");
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn validate_schema_then<R>(
        &self,
        document: &Value,
        callback: impl FnOnce(Vec<ErrorRecord>) -> R,
    ) -> R {
        callback(self.validate_schema(document))
    }

    pub fn validate_then<'s, R>(
        &self,
        schema: impl Into<SchemaRef<'s>>,
        value: &Value,
        callback: impl FnOnce(Vec<ErrorRecord>) -> R,
    ) -> R {
        callback(self.validate(schema, value))
    }

    pub fn register_schema_then<R>(
        &mut self,
        name: impl Into<String>,
        document: &Value,
        callback: impl FnOnce(Vec<ErrorRecord>) -> R,
    ) -> R {
        callback(self.register_schema(name, document))
    }

    /// Register every `*.json` file below `dir` under its file stem
    pub fn load_schema_dir(&mut self, dir: impl AsRef<Path>) -> Result<LoadSummary> {
        let dir = dir.as_ref();
        let mut summary = LoadSummary::default();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let content = fs::read_to_string(path)?;
            let document: Value =
                serde_json::from_str(&content).map_err(|source| ValidatorError::SchemaFile {
                    path: path.to_path_buf(),
                    source,
                })?;

            let errors = self.register_schema(name.clone(), &document);
            if errors.is_empty() {
                summary.loaded.push(name);
            } else {
                warn!(
                    path = %path.display(),
                    errors = errors.len(),
                    "Rejected malformed schema file"
                );
                summary.rejected.push((path.to_path_buf(), errors));
            }
        }

        debug!(dir = %dir.display(), loaded = summary.loaded.len(), "Walked schema directory");
        Ok(summary)
    }
}
