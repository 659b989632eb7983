//! Sequence schema validation.
//!
//! This module provides [`ListSchema`], which applies one validator to every
//! item, and [`TupleSchema`], which applies one validator per position. Both
//! accept lists and tuples; strings and byte strings are not sequences here.

use indexmap::IndexSet;
use stillwater::Validation;

use crate::dump::{self, Params};
use crate::error::{ContractError, ErrorKind, SchemaError, ValidationError};
use crate::load::LoadError;
use crate::path::PathSegment;
use crate::validation::Context;
use crate::value::{Map, Value, ValueKind};

use super::traits::{check_length, settle, Outcome, SchemaLike};
use super::Validator;

fn sequence(value: &Value) -> Result<&[Value], ValidationError> {
    value
        .as_seq()
        .ok_or_else(|| ValidationError::invalid_type(ValueKind::Sequence, value))
}

/// A schema for validating homogeneous sequences.
///
/// Every item is validated and every item error is reported, tagged with the
/// item's index in the input. Length limits apply to the validated result and
/// are only checked when no item failed, so an invalid item is never hidden
/// behind a length error.
///
/// # Example
///
/// ```rust
/// use vouch::{PathSegment, Schema, SchemaLike, Value};
///
/// let schema = Schema::list(Schema::integer());
///
/// let errors = schema
///     .check(&Value::list([Value::Int(1), Value::from("2"), Value::Int(3), Value::Null]))
///     .unwrap()
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(errors.len(), 2);
/// let paths: Vec<_> = errors.iter().map(|e| e.context.to_vec()).collect();
/// assert_eq!(paths, vec![vec![PathSegment::Index(1)], vec![PathSegment::Index(3)]]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ListSchema {
    item: Box<Validator>,
    nullable: bool,
    minlen: Option<usize>,
    maxlen: Option<usize>,
    unique: bool,
}

impl ListSchema {
    /// Creates a list schema validating each item with `item`.
    pub fn new(item: impl Into<Validator>) -> Self {
        Self {
            item: Box::new(item.into()),
            nullable: false,
            minlen: None,
            maxlen: None,
            unique: false,
        }
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Adds a minimum length constraint on the validated result.
    pub fn min_len(mut self, len: usize) -> Self {
        self.minlen = Some(len);
        self
    }

    /// Adds a maximum length constraint on the validated result.
    pub fn max_len(mut self, len: usize) -> Self {
        self.maxlen = Some(len);
        self
    }

    /// Drops duplicate validated items, keeping the first occurrence.
    ///
    /// Deduplication happens before length limits are checked.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, SchemaLike, Value};
    ///
    /// let schema = Schema::list(Schema::integer()).unique().min_len(3);
    ///
    /// let result = schema.check(&Value::list([3, 1, 3, 2])).unwrap();
    /// assert_eq!(result.into_result().unwrap(), Value::list([3, 1, 2]));
    ///
    /// let errors = schema.check(&Value::list([1, 1, 2])).unwrap().into_result().unwrap_err();
    /// assert_eq!(errors.first().code(), "min_length");
    /// ```
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The validator applied to every element.
    pub fn item(&self) -> &Validator {
        &self.item
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let item = params.validator("item")?;
        Ok(Self {
            item: Box::new(params.require("item", item)?),
            nullable: params.flag("nullable")?,
            minlen: params.length("minlen")?,
            maxlen: params.length("maxlen")?,
            unique: params.flag("unique")?,
        })
    }
}

impl SchemaLike for ListSchema {
    const CLASS: &'static str = "List";

    fn validate(&self, value: &Value, context: &mut Context) -> Outcome {
        if value.is_null() && self.nullable {
            return Ok(Validation::Success(Value::Null));
        }
        let items = match sequence(value) {
            Ok(items) => items,
            Err(error) => return settle(Err(error)),
        };

        let mut validated = IndexSet::new();
        let mut result = Vec::with_capacity(items.len());
        let mut errors = Vec::new();

        for (idx, item) in items.iter().enumerate() {
            match self.item.validate(item, context)? {
                Validation::Success(v) if self.unique => {
                    validated.insert(v);
                }
                Validation::Success(v) => result.push(v),
                Validation::Failure(e) => {
                    errors.extend(e.add_context(PathSegment::Index(idx)));
                }
            }
        }

        if let Some(errors) = SchemaError::new(errors) {
            return Ok(Validation::Failure(errors.into()));
        }
        if self.unique {
            result = validated.into_iter().collect();
        }

        settle(check_length(self.minlen, self.maxlen, result.len()).map(|()| Value::List(result)))
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put(params, "item", self.item.dump());
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_opt(params, "minlen", self.minlen);
        dump::put_opt(params, "maxlen", self.maxlen);
        dump::put_flag(params, "unique", self.unique);
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.item.collect_refs(refs);
    }
}

/// A schema for validating fixed-arity sequences, one validator per position.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleSchema {
    items: Vec<Validator>,
    nullable: bool,
}

impl TupleSchema {
    /// Creates a tuple schema.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Empty` if `items` is empty.
    pub fn new<V: Into<Validator>>(
        items: impl IntoIterator<Item = V>,
    ) -> Result<Self, ContractError> {
        let items: Vec<Validator> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(ContractError::empty(Self::CLASS, "items"));
        }
        Ok(Self {
            items,
            nullable: false,
        })
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The positional validators, in order.
    pub fn items(&self) -> &[Validator] {
        &self.items
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let items = params.validators("items")?;
        let mut schema = Self::new(params.require("items", items)?)?;
        schema.nullable = params.flag("nullable")?;
        Ok(schema)
    }
}

impl SchemaLike for TupleSchema {
    const CLASS: &'static str = "Tuple";

    fn validate(&self, value: &Value, context: &mut Context) -> Outcome {
        if value.is_null() && self.nullable {
            return Ok(Validation::Success(Value::Null));
        }
        let items = match sequence(value) {
            Ok(items) => items,
            Err(error) => return settle(Err(error)),
        };
        if items.len() != self.items.len() {
            return settle(Err(ValidationError::new(ErrorKind::TupleLength {
                expected: self.items.len(),
                actual: items.len(),
            })));
        }

        let mut result = Vec::with_capacity(items.len());
        let mut errors = Vec::new();

        for (idx, (validator, item)) in self.items.iter().zip(items).enumerate() {
            match validator.validate(item, context)? {
                Validation::Success(v) => result.push(v),
                Validation::Failure(e) => errors.extend(e.add_context(PathSegment::Index(idx))),
            }
        }

        Ok(match SchemaError::new(errors) {
            Some(errors) => Validation::Failure(errors.into()),
            None => Validation::Success(Value::Tuple(result)),
        })
    }

    fn dump_params(&self, params: &mut Map) {
        dump::put(
            params,
            "items",
            Value::List(self.items.iter().map(Validator::dump).collect()),
        );
        dump::put_flag(params, "nullable", self.nullable);
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for item in &self.items {
            item.collect_refs(refs);
        }
    }
}
