//! User-supplied validations keyed by schema keyword
//!
//! A custom validation named `foo` runs on every schema node that carries a
//! `foo` key, whatever the node's kind. It receives the raw schema node and
//! the instance value and returns a message when the value is rejected.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Signature of a custom validation
pub type CustomFn = dyn Fn(&Map<String, Value>, &Value) -> Option<String> + Send + Sync;

/// Name → predicate table, consulted in registration order
#[derive(Clone, Default)]
pub struct CustomValidations {
    entries: IndexMap<String, Arc<CustomFn>>,
}

impl CustomValidations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the validation for `name`
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&Map<String, Value>, &Value) -> Option<String> + Send + Sync + 'static,
    ) {
        self.entries.insert(name.into(), Arc::new(f));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.shift_remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every validation whose name is a key of `node`, collecting the
    /// non-empty messages in registration order
    pub fn run(&self, node: &Map<String, Value>, value: &Value) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, _)| node.contains_key(name.as_str()))
            .filter_map(|(_, f)| f(node, value))
            .filter(|message| !message.is_empty())
            .collect()
    }
}

impl fmt::Debug for CustomValidations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
