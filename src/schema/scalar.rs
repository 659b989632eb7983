//! Boolean, catch-all and constant schemas.

use crate::dump::{self, Params};
use crate::error::ValidationError;
use crate::load::LoadError;
use crate::validation::Context;
use crate::value::{Map, Value, ValueKind};

use super::traits::{settle, Outcome, SchemaLike};

const TRUTHY: [&str; 5] = ["1", "true", "yes", "y", "on"];
const FALSY: [&str; 5] = ["0", "false", "no", "n", "off"];

/// A schema for validating booleans.
///
/// # Example
///
/// ```rust
/// use vouch::{Schema, SchemaLike, Value};
///
/// let schema = Schema::boolean().coerce_str();
///
/// let result = schema.check(&Value::from("Yes")).unwrap();
/// assert_eq!(result.into_result().unwrap(), Value::Bool(true));
///
/// assert!(schema.check(&Value::from("maybe")).unwrap().is_failure());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolSchema {
    nullable: bool,
    coerce_str: bool,
    coerce_int: bool,
}

impl BoolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Accepts `1/true/yes/y/on` and `0/false/no/n/off`, ignoring case.
    pub fn coerce_str(mut self) -> Self {
        self.coerce_str = true;
        self
    }

    /// Accepts the integers 0 and 1.
    pub fn coerce_int(mut self) -> Self {
        self.coerce_int = true;
        self
    }

    fn coerce_checked(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Null if self.nullable => Ok(Value::Null),
            Value::Bool(_) => Ok(value.clone()),
            Value::Str(s) if self.coerce_str => {
                let lowered = s.trim().to_lowercase();
                if TRUTHY.contains(&lowered.as_str()) {
                    Ok(Value::Bool(true))
                } else if FALSY.contains(&lowered.as_str()) {
                    Ok(Value::Bool(false))
                } else {
                    let expected = TRUTHY.iter().chain(FALSY.iter()).map(|s| Value::from(*s));
                    Err(ValidationError::options(expected.collect(), s.as_str()))
                }
            }
            Value::Int(n) if self.coerce_int => match *n {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                _ => Err(ValidationError::options(vec![Value::Int(0), Value::Int(1)], *n)),
            },
            _ => Err(ValidationError::invalid_type(ValueKind::Bool, value)),
        }
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            nullable: params.flag("nullable")?,
            coerce_str: params.flag("coerce_str")?,
            coerce_int: params.flag("coerce_int")?,
        })
    }
}

impl SchemaLike for BoolSchema {
    const CLASS: &'static str = "Bool";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(self.coerce_checked(value))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_flag(params, "coerce_str", self.coerce_str);
        dump::put_flag(params, "coerce_int", self.coerce_int);
    }
}

/// Accepts any value except null, which needs [`nullable`](Self::nullable).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnySchema {
    nullable: bool,
}

impl AnySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets null through untouched.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            nullable: params.flag("nullable")?,
        })
    }
}

impl SchemaLike for AnySchema {
    const CLASS: &'static str = "Any";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(if value.is_null() && !self.nullable {
            Err(ValidationError::invalid_type(ValueKind::Any, value))
        } else {
            Ok(value.clone())
        })
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put_flag(params, "nullable", self.nullable);
    }
}

/// Accepts exactly one value.
///
/// Any other value fails with an `options` error listing the constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSchema {
    value: Value,
    nullable: bool,
}

impl ConstSchema {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            nullable: false,
        }
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let value = params.value("value");
        let value = params.require("value", value)?;
        Ok(Self {
            value,
            nullable: params.flag("nullable")?,
        })
    }
}

impl SchemaLike for ConstSchema {
    const CLASS: &'static str = "Const";

    fn validate(&self, value: &Value, _context: &mut Context) -> Outcome {
        settle(if (value.is_null() && self.nullable) || *value == self.value {
            Ok(value.clone())
        } else {
            Err(ValidationError::options(vec![self.value.clone()], value.clone()))
        })
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put(params, "value", self.value.clone());
        dump::put_flag(params, "nullable", self.nullable);
    }
}
