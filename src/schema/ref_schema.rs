//! Lazy references to registered validators.
//!
//! This module provides [`LazyRefSchema`], which names a validator in the
//! registry instead of holding it. The alias is resolved on every call, which
//! allows recursive structures and forward references.

use stillwater::Validation;
use tracing::{debug, trace};

use crate::dump::{self, Params};
use crate::error::{ErrorKind, Invalid, ValidationError};
use crate::load::LoadError;
use crate::validation::Context;
use crate::value::{Map, Value};

use super::traits::{Outcome, SchemaLike};

fn recursion_error(expected: usize, actual: usize) -> Outcome {
    Ok(Validation::Failure(Invalid::Error(ValidationError::new(
        ErrorKind::RecursionMaxDepth { expected, actual },
    ))))
}

/// A validator that delegates to a registered alias.
///
/// The alias is looked up in the context's registry when the reference is
/// validated; an alias that is not registered is a configuration defect and
/// surfaces as the `Err` side of the outcome, never as a validation error.
///
/// Two limits guard recursion. [`max_depth`](Self::max_depth) bounds how many
/// times this alias may be entered within one call, tracked in the context's
/// data store; the registry's `max_depth` bounds the total nesting of lazy
/// references.
///
/// # Example
///
/// ```rust
/// use vouch::{Registry, Schema, Value};
///
/// let registry = Registry::new();
/// registry
///     .add(
///         "node",
///         Schema::dict()
///             .field("value", Schema::integer())
///             .optional("next", Schema::lazy_ref("node").max_depth(2)),
///     )
///     .unwrap();
///
/// let shallow = Value::map([
///     ("value", Value::Int(1)),
///     ("next", Value::map([("value", 2)])),
/// ]);
/// assert!(registry.validate("node", &shallow).unwrap().is_success());
///
/// let deep = Value::map([
///     ("value", Value::Int(1)),
///     ("next", Value::map([
///         ("value", Value::Int(2)),
///         ("next", Value::map([
///             ("value", Value::Int(3)),
///             ("next", Value::map([("value", 4)])),
///         ])),
///     ])),
/// ]);
/// let errors = registry.validate("node", &deep).unwrap().into_result().unwrap_err();
/// assert_eq!(errors.first().code(), "recursion_max_depth");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LazyRefSchema {
    target: String,
    maxdepth: Option<usize>,
}

impl LazyRefSchema {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            target: alias.into(),
            maxdepth: None,
        }
    }

    /// Limits how deep this alias may recurse within one call.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.maxdepth = Some(depth);
        self
    }

    /// Returns the referenced alias.
    pub fn target(&self) -> &str {
        &self.target
    }

    fn depth_key(&self) -> String {
        format!("lazyref.{}", self.target)
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let target = params.string("use")?;
        Ok(Self {
            target: params.require("use", target)?,
            maxdepth: params.length("maxdepth")?,
        })
    }
}

impl SchemaLike for LazyRefSchema {
    const CLASS: &'static str = "LazyRef";

    fn validate(&self, value: &Value, context: &mut Context) -> Outcome {
        let key = self.depth_key();
        let depth = context
            .get(&key)
            .and_then(Value::as_int)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);

        if let Some(maxdepth) = self.maxdepth {
            if depth >= maxdepth {
                debug!(alias = %self.target, maxdepth, "lazy reference recursion limit reached");
                return recursion_error(maxdepth, depth + 1);
            }
        }
        if context.depth() >= context.max_depth() {
            debug!(
                alias = %self.target,
                max_depth = context.max_depth(),
                "lazy reference nesting limit reached"
            );
            return recursion_error(context.max_depth(), context.depth() + 1);
        }

        let validator = context.registry().get(&self.target)?;
        trace!(alias = %self.target, depth = context.depth(), "resolved lazy reference");

        context.enter();
        context.insert(key.clone(), depth + 1);
        let outcome = validator.validate(value, context);
        if depth == 0 {
            context.remove(&key);
        } else {
            context.insert(key, depth);
        }
        context.leave();

        outcome
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put(params, "use", self.target.as_str());
        dump::put_opt(params, "maxdepth", self.maxdepth);
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        refs.push(self.target.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, RegistryError};
    use crate::schema::Schema;

    #[test]
    fn test_unregistered_alias_is_a_configuration_error() {
        let schema = LazyRefSchema::new("missing");
        match schema.check(&Value::Int(1)) {
            Err(RegistryError::NotRegistered(alias)) => assert_eq!(alias, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_resolves_through_context_registry() {
        let registry = Registry::new();
        registry.put("id", Schema::integer().min(1));
        let mut context = Context::new(registry);

        let schema = LazyRefSchema::new("id");
        assert!(schema
            .validate(&Value::Int(3), &mut context)
            .unwrap()
            .is_success());
        assert!(schema
            .validate(&Value::Int(0), &mut context)
            .unwrap()
            .is_failure());
        assert_eq!(context.depth(), 0);
        assert!(context.get("lazyref.id").is_none());
        assert!(context.data().is_empty());
    }

    #[test]
    fn test_outer_depth_is_restored() {
        let registry = Registry::new();
        registry.put("id", Schema::integer());
        let mut context = Context::new(registry);
        context.insert("lazyref.id", 1);

        let schema = LazyRefSchema::new("id");
        assert!(schema
            .validate(&Value::Int(3), &mut context)
            .unwrap()
            .is_success());
        assert_eq!(context.get("lazyref.id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_registry_depth_limit() {
        let registry = Registry::new().with_max_depth(3);
        registry.put("loop", Schema::lazy_ref("loop"));

        let errors = registry
            .validate("loop", &Value::Null)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(
            errors.first().kind,
            ErrorKind::RecursionMaxDepth {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_per_alias_depth_limit() {
        let registry = Registry::new();
        registry.put("loop", Schema::lazy_ref("loop").max_depth(2));
        let mut context = Context::new(registry);

        let errors = LazyRefSchema::new("loop")
            .validate(&Value::Null, &mut context)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(
            errors.first().kind,
            ErrorKind::RecursionMaxDepth {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(context.depth(), 0);
    }
}
