//! Numeric schema validation.
//!
//! This module provides [`IntSchema`] for integers and [`FloatSchema`] for
//! floating point numbers.

use std::collections::BTreeSet;

use crate::dump::{self, Params};
use crate::error::{ContractError, ErrorKind, ValidationError};
use crate::load::LoadError;
use crate::validation::Context;
use crate::value::{Map, Value, ValueKind};

use super::traits::{settle, Outcome, SchemaLike};

/// A schema for validating integer values.
///
/// Constraints are checked in the order min, max, options; the first one
/// violated is the error reported.
///
/// # Example
///
/// ```rust
/// use vouch::{Schema, SchemaLike, Value};
///
/// let schema = Schema::integer().min(0).max(100);
///
/// assert!(schema.check(&Value::Int(50)).unwrap().is_success());
/// assert!(schema.check(&Value::Int(-5)).unwrap().is_failure());
///
/// // Floats are rejected unless coercion is enabled
/// assert!(schema.check(&Value::Float(1.0)).unwrap().is_failure());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntSchema {
    nullable: bool,
    coerce: bool,
    min: Option<i64>,
    max: Option<i64>,
    options: Option<BTreeSet<i64>>,
}

impl IntSchema {
    /// Creates a new integer schema with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts null, returning it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Converts integral floats and numeric strings to integers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, SchemaLike, Value};
    ///
    /// let schema = Schema::integer().coerce();
    ///
    /// let result = schema.check(&Value::from(" 42 ")).unwrap();
    /// assert_eq!(result.into_result().unwrap(), Value::Int(42));
    ///
    /// assert!(schema.check(&Value::Float(1.5)).unwrap().is_failure());
    /// ```
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: i64) -> Self {
        self.min = Some(value);
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: i64) -> Self {
        self.max = Some(value);
        self
    }

    /// Restricts the value to an enumerated set.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Empty` if no options are given.
    pub fn options(
        mut self,
        options: impl IntoIterator<Item = i64>,
    ) -> Result<Self, ContractError> {
        let options: BTreeSet<i64> = options.into_iter().collect();
        if options.is_empty() {
            return Err(ContractError::empty(Self::CLASS, "options"));
        }
        self.options = Some(options);
        Ok(self)
    }

    fn coerce_value(&self, value: &Value) -> Result<i64, ValidationError> {
        match value {
            Value::Int(n) => Ok(*n),
            Value::Float(x) if self.coerce && x.fract() == 0.0 && x.is_finite() => {
                integral(*x).ok_or_else(|| ValidationError::invalid_type(ValueKind::Int, value))
            }
            Value::Str(s) if self.coerce => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
                    .ok_or_else(|| ValidationError::invalid_type(ValueKind::Int, value))
            }
            _ => Err(ValidationError::invalid_type(ValueKind::Int, value)),
        }
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_null() && self.nullable {
            return Ok(Value::Null);
        }
        let n = self.coerce_value(value)?;

        if let Some(min) = self.min {
            if n < min {
                return Err(ValidationError::min_value(min, n));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return Err(ValidationError::max_value(max, n));
            }
        }
        if let Some(options) = &self.options {
            if !options.contains(&n) {
                return Err(ValidationError::options(
                    options.iter().copied().map(Value::Int).collect(),
                    n,
                ));
            }
        }
        Ok(Value::Int(n))
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let mut schema = Self {
            nullable: params.flag("nullable")?,
            coerce: params.flag("coerce")?,
            min: params.int("min")?,
            max: params.int("max")?,
            options: None,
        };
        if let Some(options) = params.ints("options")? {
            schema.options = Some(options.into_iter().collect());
        }
        Ok(schema)
    }
}

fn integral(x: f64) -> Option<i64> {
    if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

impl SchemaLike for IntSchema {
    const CLASS: &'static str = "Int";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_flag(params, "coerce", self.coerce);
        dump::put_opt(params, "min", self.min);
        dump::put_opt(params, "max", self.max);
        dump::put_list(params, "options", self.options.clone());
    }
}

/// A schema for validating floating point values.
///
/// Integers are always accepted and widened to floats. NaN and infinities
/// are rejected unless enabled with [`allow_nan`](Self::allow_nan) and
/// [`allow_inf`](Self::allow_inf).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloatSchema {
    nullable: bool,
    coerce: bool,
    nan: bool,
    inf: bool,
    min: Option<f64>,
    max: Option<f64>,
}

impl FloatSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Parses numeric strings.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Accepts NaN instead of failing with `float_value`.
    pub fn allow_nan(mut self) -> Self {
        self.nan = true;
        self
    }

    /// Accepts positive and negative infinity.
    pub fn allow_inf(mut self) -> Self {
        self.inf = true;
        self
    }

    /// Adds a minimum value constraint (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Invalid` if `value` is NaN.
    pub fn min(mut self, value: f64) -> Result<Self, ContractError> {
        self.min = Some(bound("min", value)?);
        Ok(self)
    }

    /// Adds a maximum value constraint (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Invalid` if `value` is NaN.
    pub fn max(mut self, value: f64) -> Result<Self, ContractError> {
        self.max = Some(bound("max", value)?);
        Ok(self)
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        let x = match value {
            Value::Null if self.nullable => return Ok(Value::Null),
            Value::Float(x) => *x,
            Value::Int(n) => *n as f64,
            Value::Str(s) if self.coerce => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::invalid_type(ValueKind::Float, value))?,
            _ => return Err(ValidationError::invalid_type(ValueKind::Float, value)),
        };

        if x.is_nan() {
            if !self.nan {
                return Err(ValidationError::new(ErrorKind::FloatValue {
                    expected: "number".to_string(),
                    actual: x,
                }));
            }
            return Ok(Value::Float(x));
        }
        if x.is_infinite() && !self.inf {
            return Err(ValidationError::new(ErrorKind::FloatValue {
                expected: "finite number".to_string(),
                actual: x,
            }));
        }
        if let Some(min) = self.min {
            if x < min {
                return Err(ValidationError::min_value(min, x));
            }
        }
        if let Some(max) = self.max {
            if x > max {
                return Err(ValidationError::max_value(max, x));
            }
        }
        Ok(Value::Float(x))
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let mut schema = Self {
            nullable: params.flag("nullable")?,
            coerce: params.flag("coerce")?,
            nan: params.flag("nan")?,
            inf: params.flag("inf")?,
            ..Self::default()
        };
        if let Some(min) = params.float("min")? {
            schema = schema.min(min)?;
        }
        if let Some(max) = params.float("max")? {
            schema = schema.max(max)?;
        }
        Ok(schema)
    }
}

fn bound(param: &str, value: f64) -> Result<f64, ContractError> {
    if value.is_nan() {
        Err(ContractError::invalid(FloatSchema::CLASS, param, "NaN is not a valid bound"))
    } else {
        Ok(value)
    }
}

impl SchemaLike for FloatSchema {
    const CLASS: &'static str = "Float";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_flag(params, "coerce", self.coerce);
        dump::put_flag(params, "nan", self.nan);
        dump::put_flag(params, "inf", self.inf);
        dump::put_opt(params, "min", self.min);
        dump::put_opt(params, "max", self.max);
    }
}
