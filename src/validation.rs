//! Validation context passed down a single validation call.
//!
//! This module provides the [`Context`] type that carries the registry used
//! to resolve lazy references, the reference depth, and a free-form data
//! store that validators may use as a side channel between siblings.

use indexmap::IndexMap;

use crate::registry::Registry;
use crate::value::Value;

/// Per-call validation state.
///
/// A context is created for each top-level validation and threaded through
/// the recursion by mutable reference. Nodes may read and write its data
/// store but never replace it. Contexts must not be shared across concurrent
/// calls; the validators themselves can be.
///
/// # Example
///
/// ```rust
/// use vouch::{Context, Registry, Schema, SchemaLike, Value};
///
/// let registry = Registry::new().with_max_depth(10);
/// let mut context = Context::new(registry);
/// context.insert("tenant", "acme");
///
/// let result = Schema::integer().validate(&Value::Int(5), &mut context).unwrap();
/// assert!(result.is_success());
/// assert_eq!(context.get("tenant"), Some(&Value::from("acme")));
/// assert_eq!(context.max_depth(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    registry: Registry,
    depth: usize,
    data: IndexMap<String, Value>,
}

impl Context {
    /// Creates a context resolving lazy references through `registry`.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            depth: 0,
            data: IndexMap::new(),
        }
    }

    /// Returns the registry used for lookups.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the current lazy-reference nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the maximum lazy-reference nesting depth.
    pub fn max_depth(&self) -> usize {
        self.registry.max_depth()
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Reads a value from the data store.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Writes a value into the data store, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Removes a value from the data store.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Returns the whole data store.
    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }
}
