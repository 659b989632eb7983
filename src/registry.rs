//! Alias registry for named validators.
//!
//! This module provides the [`Registry`] type that stores validators under
//! string aliases. Lazy references resolve through it at validation time,
//! and dump trees refer to its entries with `__use__` / `__clone__`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::schema::{Factory, Outcome, Validator};
use crate::validation::Context;
use crate::value::Value;

type ValidatorMap = Arc<RwLock<HashMap<String, Arc<Validator>>>>;
type FactoryMap = Arc<RwLock<HashMap<String, Factory>>>;

/// A thread-safe table of named validators.
///
/// Cloning a registry is cheap and yields a handle to the same table, so a
/// registry can be created once and passed wherever it is needed.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` for thread-safe access:
/// - Multiple threads can validate concurrently (read-only access)
/// - Registration operations are serialized (write access)
///
/// # Example
///
/// ```rust
/// use vouch::{Registry, Schema, Validator};
///
/// let registry = Registry::new();
/// registry.add("foo", Schema::integer()).unwrap();
///
/// // A structurally different validator may not silently replace it.
/// assert!(registry.add("foo", Schema::string()).is_err());
///
/// registry.put("foo", Schema::string());
/// assert_eq!(*registry.get("foo").unwrap(), Validator::from(Schema::string()));
/// ```
pub struct Registry {
    validators: ValidatorMap,
    factories: FactoryMap,
    max_depth: usize,
}

impl Registry {
    /// Creates a new empty registry with default max depth (100).
    pub fn new() -> Self {
        Self {
            validators: Arc::new(RwLock::new(HashMap::new())),
            factories: Arc::new(RwLock::new(HashMap::new())),
            max_depth: 100,
        }
    }

    /// Sets the maximum lazy-reference nesting depth.
    ///
    /// The default max depth is 100. When validating recursive schemas, a
    /// reference chain deeper than this fails with `recursion_max_depth`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::Registry;
    ///
    /// let registry = Registry::new().with_max_depth(50);
    /// assert_eq!(registry.max_depth(), 50);
    /// ```
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Registers `validator` under `alias`.
    ///
    /// Registering a structurally equal validator again is a no-op and
    /// returns the existing instance.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Conflict` if the alias is taken by a different
    /// validator.
    pub fn add(
        &self,
        alias: impl Into<String>,
        validator: impl Into<Validator>,
    ) -> Result<Arc<Validator>, RegistryError> {
        let alias = alias.into();
        let validator = validator.into();
        let mut validators = self.validators.write();

        if let Some(existing) = validators.get(&alias) {
            if **existing == validator {
                return Ok(Arc::clone(existing));
            }
            return Err(RegistryError::Conflict {
                alias,
                new: validator.to_string(),
                existing: existing.to_string(),
            });
        }

        debug!(alias = %alias, class = validator.class(), "registered validator");
        let validator = Arc::new(validator);
        validators.insert(alias, Arc::clone(&validator));
        Ok(validator)
    }

    /// Registers `validator` under `alias`, replacing any previous entry.
    pub fn put(&self, alias: impl Into<String>, validator: impl Into<Validator>) -> Arc<Validator> {
        let alias = alias.into();
        let validator = Arc::new(validator.into());
        debug!(alias = %alias, class = validator.class(), "replaced validator");
        self.validators
            .write()
            .insert(alias, Arc::clone(&validator));
        validator
    }

    /// Looks up the validator registered under `alias`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotRegistered` if the alias is unknown.
    pub fn get(&self, alias: &str) -> Result<Arc<Validator>, RegistryError> {
        self.validators
            .read()
            .get(alias)
            .cloned()
            .ok_or_else(|| RegistryError::NotRegistered(alias.to_string()))
    }

    /// Returns true if `alias` is registered.
    pub fn contains(&self, alias: &str) -> bool {
        self.validators.read().contains_key(alias)
    }

    /// Returns every registered alias, sorted.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.validators.read().keys().cloned().collect();
        aliases.sort();
        aliases
    }

    /// Removes every validator and factory.
    pub fn clear(&self) {
        debug!("cleared registry");
        self.validators.write().clear();
        self.factories.write().clear();
    }

    /// Validates a value against a named validator.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotRegistered` if the alias, or any alias a
    /// lazy reference reaches during validation, is unknown.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Registry, Schema, Value};
    ///
    /// let registry = Registry::new();
    /// registry.add("age", Schema::integer().min(0)).unwrap();
    ///
    /// let result = registry.validate("age", &Value::Int(30)).unwrap();
    /// assert!(result.is_success());
    ///
    /// assert!(registry.validate("missing", &Value::Int(30)).is_err());
    /// ```
    pub fn validate(&self, alias: &str, value: &Value) -> Outcome {
        let validator = self.get(alias)?;
        let mut context = Context::new(self.clone());
        validator.validate(value, &mut context)
    }

    /// Returns the aliases referenced by registered lazy references that are
    /// not themselves registered.
    ///
    /// Call this after all validators are registered to check reference
    /// integrity.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Registry, Schema};
    ///
    /// let registry = Registry::new();
    /// registry
    ///     .add("user", Schema::dict().field("id", Schema::lazy_ref("user_id")))
    ///     .unwrap();
    ///
    /// assert_eq!(registry.unresolved_refs(), vec!["user_id"]);
    /// ```
    pub fn unresolved_refs(&self) -> Vec<String> {
        let validators = self.validators.read();
        let mut refs = Vec::new();

        for validator in validators.values() {
            validator.collect_refs(&mut refs);
        }

        let mut unresolved: Vec<String> = refs
            .into_iter()
            .filter(|alias| !validators.contains_key(alias))
            .collect();
        unresolved.sort();
        unresolved.dedup();
        unresolved
    }

    /// Registers a named default factory so dict defaults built from it can
    /// be loaded back from a dump tree.
    pub fn register_factory(&self, factory: Factory) {
        debug!(name = factory.name(), "registered default factory");
        self.factories
            .write()
            .insert(factory.name().to_string(), factory);
    }

    /// Looks up a named default factory.
    pub fn factory(&self, name: &str) -> Result<Factory, RegistryError> {
        self.factories
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::FactoryNotRegistered(name.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            validators: Arc::clone(&self.validators),
            factories: Arc::clone(&self.factories),
            max_depth: self.max_depth,
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("aliases", &self.aliases())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// `add` found a different validator under the alias.
    #[error("alias {alias:?} of <{new}> conflicts with <{existing}>")]
    Conflict {
        alias: String,
        new: String,
        existing: String,
    },

    #[error("instance {0:?} is not registered")]
    NotRegistered(String),

    #[error("default factory {0:?} is not registered")]
    FactoryNotRegistered(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_add_same_validator_twice() {
        let registry = Registry::new();
        let first = registry.add("n", Schema::integer().min(0)).unwrap();
        let second = registry.add("n", Schema::integer().min(0)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_conflict_message_names_both() {
        let registry = Registry::new();
        registry.add("foo", Schema::integer()).unwrap();
        let error = registry.add("foo", Schema::string()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "alias \"foo\" of <Str()> conflicts with <Int()>"
        );
    }

    #[test]
    fn test_clones_share_state() {
        let registry = Registry::new();
        let handle = registry.clone();
        handle.put("x", Schema::any());
        assert!(registry.contains("x"));
        registry.clear();
        assert!(handle.aliases().is_empty());
    }

    #[test]
    fn test_not_registered() {
        let registry = Registry::new();
        assert_eq!(
            registry.get("unknown").unwrap_err().to_string(),
            "instance \"unknown\" is not registered"
        );
    }

    #[test]
    fn test_factories() {
        let registry = Registry::new();
        assert!(registry.factory("empty_list").is_err());
        registry.register_factory(Factory::new("empty_list", || Value::list(Vec::<Value>::new())));
        assert_eq!(
            registry.factory("empty_list").unwrap().make(),
            Value::List(vec![])
        );
    }
}
