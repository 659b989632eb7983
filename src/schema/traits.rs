//! The contract shared by every validator node.
//!
//! This module provides the [`SchemaLike`] trait and the result aliases used
//! by validation calls.

use stillwater::Validation;

use crate::error::{ErrorKind, Invalid, ValidationError};
use crate::registry::RegistryError;
use crate::validation::Context;
use crate::value::{Map, Value};

/// The data outcome of a validation call: the canonical value, or every
/// error found.
pub type ValidationResult<T = Value> = Validation<T, Invalid>;

/// A full validation outcome.
///
/// The outer `Result` carries configuration defects (a lazy reference to an
/// alias that is not registered); those are never reported as data errors.
pub type Outcome = Result<ValidationResult, RegistryError>;

/// A validator node.
///
/// Every node kind implements `SchemaLike`; the [`Validator`](crate::Validator)
/// enum dispatches to them. The `Send + Sync` bounds allow schemas to be
/// shared across threads.
///
/// # Example
///
/// ```rust
/// use vouch::{Schema, SchemaLike, Value};
///
/// let schema = Schema::string().min_len(2).max_len(5);
///
/// assert!(schema.check(&Value::from("abc")).unwrap().is_success());
/// assert!(schema.check(&Value::from("a")).unwrap().is_failure());
/// ```
pub trait SchemaLike: Send + Sync {
    /// Class discriminator used in dump trees.
    const CLASS: &'static str;

    /// Validates `value`, returning its canonical form or every error found.
    fn validate(&self, value: &Value, context: &mut Context) -> Outcome;

    /// Validates `value` with a fresh default context.
    fn check(&self, value: &Value) -> Outcome {
        self.validate(value, &mut Context::default())
    }

    /// Writes every non-default parameter into `params`.
    fn dump_params(&self, params: &mut Map);

    /// Collects the aliases of every lazy reference reachable from this node.
    fn collect_refs(&self, _refs: &mut Vec<String>) {}
}

/// Lifts the single-error outcome of a leaf into a full [`Outcome`].
pub(crate) fn settle(result: Result<Value, ValidationError>) -> Outcome {
    Ok(match result {
        Ok(value) => Validation::Success(value),
        Err(error) => Validation::Failure(Invalid::Error(error)),
    })
}

pub(crate) fn check_length(
    minlen: Option<usize>,
    maxlen: Option<usize>,
    len: usize,
) -> Result<(), ValidationError> {
    if let Some(minlen) = minlen {
        if len < minlen {
            return Err(ValidationError::new(ErrorKind::MinLength {
                expected: minlen,
                actual: len,
            }));
        }
    }
    if let Some(maxlen) = maxlen {
        if len > maxlen {
            return Err(ValidationError::new(ErrorKind::MaxLength {
                expected: maxlen,
                actual: len,
            }));
        }
    }
    Ok(())
}
