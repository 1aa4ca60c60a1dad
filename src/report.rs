//! Violation records and their accumulation

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path;

/// A single violation found by either engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Where the violation was found (e.g. `$['user']['age']`)
    pub locator: String,
    /// Keyword or property the message is about; empty when it concerns
    /// the value at `locator` itself
    pub field: String,
    /// Human-readable description
    pub message: String,
    /// The offending value
    pub actual: Value,
}

impl ErrorRecord {
    pub fn new(
        locator: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
        actual: Value,
    ) -> Self {
        Self {
            locator: locator.into(),
            field: field.into(),
            message: message.into(),
            actual,
        }
    }

    /// The locator extended by `field`
    pub fn pointer(&self) -> String {
        path::with_key(&self.locator, &self.field)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (actual: {})", self.pointer(), self.message, self.actual)
    }
}

/// Ordered accumulation of [`ErrorRecord`]s.
///
/// Records are kept in arrival order and never deduplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorSink {
    records: Vec<ErrorRecord>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        locator: &str,
        field: &str,
        message: impl Into<String>,
        actual: Value,
    ) {
        self.records
            .push(ErrorRecord::new(locator, field, message, actual));
    }

    /// Move every record of `other` onto the end of this sink
    pub fn append(&mut self, other: ErrorSink) {
        self.records.extend(other.records);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<ErrorRecord> {
        self.records
    }
}

impl From<ErrorSink> for Vec<ErrorRecord> {
    fn from(sink: ErrorSink) -> Self {
        sink.into_vec()
    }
}

/// JSON-ish type name of a value, used as `actual` for type mismatches
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
