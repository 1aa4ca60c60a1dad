//! Named schema storage
//!
//! Holds compiled schemas by name. Only well-formed schemas ever reach the
//! store, so lookups hand back something that can be validated against
//! without re-checking it.

use indexmap::IndexMap;

use crate::schema::Schema;

/// Registered schemas, in registration order
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    schemas: IndexMap<String, Schema>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `schema` under `name`, returning the schema it replaced
    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) -> Option<Schema> {
        self.schemas.insert(name.into(), schema)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Schema> {
        self.schemas.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
