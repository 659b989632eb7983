//! Schema combinators for composing validation logic.
//!
//! - [`AllOfSchema`]: a pipeline, each step validating the previous step's output
//! - [`OneOfSchema`]: alternatives, the first branch that succeeds wins
//!
//! # Example
//!
//! ```rust
//! use vouch::{Schema, SchemaLike, Value};
//!
//! // A string or integer id
//! let id = Schema::one_of([
//!     vouch::Validator::from(Schema::string().min_len(1)),
//!     Schema::integer().min(1).into(),
//! ])
//! .unwrap();
//!
//! assert!(id.check(&Value::from("abc")).unwrap().is_success());
//! assert!(id.check(&Value::Int(7)).unwrap().is_success());
//! assert!(id.check(&Value::Int(0)).unwrap().is_failure());
//! ```

use stillwater::Validation;

use crate::dump::{self, Params};
use crate::error::{ContractError, SchemaError};
use crate::load::LoadError;
use crate::path::PathSegment;
use crate::validation::Context;
use crate::value::{Map, Value};

use super::traits::{Outcome, SchemaLike};
use super::Validator;

fn collect_steps<V: Into<Validator>>(
    class: &'static str,
    steps: impl IntoIterator<Item = V>,
) -> Result<Vec<Validator>, ContractError> {
    let steps: Vec<Validator> = steps.into_iter().map(Into::into).collect();
    if steps.is_empty() {
        return Err(ContractError::empty(class, "steps"));
    }
    Ok(steps)
}

fn dump_steps(params: &mut Map, steps: &[Validator]) {
    dump::put(
        params,
        "steps",
        Value::List(steps.iter().map(Validator::dump).collect()),
    );
}

/// All steps must pass, in order.
///
/// Each step validates the output of the previous one, so coercing steps can
/// feed stricter ones. The first failure aborts the pipeline and is reported
/// with the index of the failing step prepended to its path; a single error
/// stays a single error.
///
/// # Example
///
/// ```rust
/// use vouch::{PathSegment, Schema, SchemaLike, Validator, Value};
///
/// let schema = Schema::all_of([
///     Validator::from(Schema::integer().coerce()),
///     Schema::integer().min(10).into(),
/// ])
/// .unwrap();
///
/// let result = schema.check(&Value::from("42")).unwrap();
/// assert_eq!(result.into_result().unwrap(), Value::Int(42));
///
/// let errors = schema.check(&Value::from("5")).unwrap().into_result().unwrap_err();
/// assert_eq!(errors.first().code(), "min_value");
/// assert_eq!(errors.first().context.to_vec(), vec![PathSegment::Step(1)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AllOfSchema {
    steps: Vec<Validator>,
}

impl AllOfSchema {
    /// Creates a pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Empty` if `steps` is empty.
    pub fn new<V: Into<Validator>>(
        steps: impl IntoIterator<Item = V>,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            steps: collect_steps(Self::CLASS, steps)?,
        })
    }

    /// The steps, in the order they run.
    pub fn steps(&self) -> &[Validator] {
        &self.steps
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let steps = params.validators("steps")?;
        Ok(Self {
            steps: params.require("steps", steps)?,
        })
    }
}

impl SchemaLike for AllOfSchema {
    const CLASS: &'static str = "AllOf";

    fn validate(&self, value: &Value, context: &mut Context) -> Outcome {
        let mut current = value.clone();
        for (idx, step) in self.steps.iter().enumerate() {
            match step.validate(&current, context)? {
                Validation::Success(v) => current = v,
                Validation::Failure(e) => {
                    return Ok(Validation::Failure(e.add_context(PathSegment::Step(idx))))
                }
            }
        }
        Ok(Validation::Success(current))
    }

    fn dump_params(&self, params: &mut Map) {
        dump_steps(params, &self.steps);
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for step in &self.steps {
            step.collect_refs(refs);
        }
    }
}

/// At least one branch must pass.
///
/// Branches are tried in order against the original input and the first
/// success wins. When every branch fails, the errors of all branches are
/// reported together, each tagged with its branch index.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfSchema {
    steps: Vec<Validator>,
}

impl OneOfSchema {
    /// Creates a set of alternatives.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Empty` if `steps` is empty.
    pub fn new<V: Into<Validator>>(
        steps: impl IntoIterator<Item = V>,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            steps: collect_steps(Self::CLASS, steps)?,
        })
    }

    /// The branches, in the order they are tried.
    pub fn steps(&self) -> &[Validator] {
        &self.steps
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let steps = params.validators("steps")?;
        Ok(Self {
            steps: params.require("steps", steps)?,
        })
    }
}

impl SchemaLike for OneOfSchema {
    const CLASS: &'static str = "OneOf";

    fn validate(&self, value: &Value, context: &mut Context) -> Outcome {
        let mut errors = Vec::new();
        for (idx, step) in self.steps.iter().enumerate() {
            match step.validate(value, context)? {
                Validation::Success(v) => return Ok(Validation::Success(v)),
                Validation::Failure(e) => errors.extend(e.add_context(PathSegment::Step(idx))),
            }
        }
        Ok(match SchemaError::new(errors) {
            Some(errors) => Validation::Failure(errors.into()),
            None => Validation::Success(value.clone()),
        })
    }

    fn dump_params(&self, params: &mut Map) {
        dump_steps(params, &self.steps);
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for step in &self.steps {
            step.collect_refs(refs);
        }
    }
}
