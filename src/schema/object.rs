//! Mapping schema validation.
//!
//! This module provides [`DictSchema`] and [`MappingSchema`] for validating
//! mappings with declared keys, optional keys, default values and handling of
//! undeclared keys. Both are [`KeyedSchema`]s and differ only in the input
//! shapes they accept: `Dict` takes plain mappings, `Mapping` also takes
//! multi-valued ones and can batch repeated keys.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use stillwater::Validation;

use crate::dump::{self, Params};
use crate::error::{ContractError, ErrorKind, SchemaError, ValidationError};
use crate::load::LoadError;
use crate::path::PathSegment;
use crate::validation::Context;
use crate::value::{Map, Value, ValueKind};

use super::traits::{check_length, settle, Outcome, SchemaLike};
use super::Validator;

/// A named zero-argument producer of default values.
///
/// Factories are compared by name and dump by name under the
/// `default_factories` parameter; a dump tree referencing a factory loads
/// only if the registry knows the name (see
/// [`Registry::register_factory`](crate::Registry::register_factory)).
#[derive(Clone)]
pub struct Factory {
    name: String,
    make: Arc<dyn Fn() -> Value + Send + Sync>,
}

impl Factory {
    /// Wraps `make` under `name`.
    pub fn new(name: impl Into<String>, make: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            make: Arc::new(make),
        }
    }

    /// Returns the name the factory is registered and dumped under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produces a fresh value.
    pub fn make(&self) -> Value {
        (self.make)()
    }
}

impl PartialEq for Factory {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Factory").field(&self.name).finish()
    }
}

/// The value used for a declared key missing from the input.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Cloned on every use.
    Literal(Value),
    /// Invoked on every use.
    Factory(Factory),
}

impl DefaultValue {
    fn produce(&self) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Factory(factory) => factory.make(),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Literal(value)
    }
}

impl From<Factory> for DefaultValue {
    fn from(factory: Factory) -> Self {
        DefaultValue::Factory(factory)
    }
}

/// Input shapes accepted by a [`KeyedSchema`].
pub trait KeyedShape:
    fmt::Debug + Clone + Copy + PartialEq + Default + Send + Sync + 'static
{
    /// Class discriminator of schemas with this shape.
    const CLASS: &'static str;
    /// Whether multi-valued mappings are accepted.
    const MULTI: bool;
    /// Kind reported when the input has the wrong shape.
    const EXPECTED: ValueKind;
}

/// Plain mappings only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DictShape;

/// Plain and multi-valued mappings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MappingShape;

impl KeyedShape for DictShape {
    const CLASS: &'static str = "Dict";
    const MULTI: bool = false;
    const EXPECTED: ValueKind = ValueKind::Dict;
}

impl KeyedShape for MappingShape {
    const CLASS: &'static str = "Mapping";
    const MULTI: bool = true;
    const EXPECTED: ValueKind = ValueKind::Mapping;
}

/// A schema accepting only plain mappings.
pub type DictSchema = KeyedSchema<DictShape>;

/// A schema accepting any mapping, including multi-valued ones.
///
/// # Example
///
/// ```rust
/// use vouch::{Schema, SchemaLike, Value};
///
/// let schema = Schema::mapping()
///     .field("tag", Schema::list(Schema::string()))
///     .multikey("tag");
///
/// let input = Value::multimap([("tag", "a"), ("tag", "b")]);
/// assert_eq!(
///     schema.check(&input).unwrap().into_result().unwrap(),
///     Value::map([("tag", Value::list(["a", "b"]))])
/// );
///
/// // Dict rejects the same input
/// assert!(Schema::dict().check(&input).unwrap().is_failure());
/// ```
pub type MappingSchema = KeyedSchema<MappingShape>;

/// A schema for validating mappings.
///
/// `KeyedSchema` validates that values are mappings and checks every declared
/// key with its validator. All key errors are accumulated and sorted by path
/// rather than short-circuiting on the first failure.
///
/// Undeclared keys go through the [`extra`](Self::extra) validators when
/// configured, are dropped when named in [`dispose`](Self::dispose), and are
/// rejected otherwise. A declared key that is missing takes its default, is
/// skipped when optional, and is reported missing otherwise.
///
/// # Example
///
/// ```rust
/// use vouch::{PathSegment, Schema, SchemaLike, Value};
///
/// let schema = Schema::dict()
///     .field("x", Schema::integer())
///     .field("y", Schema::integer());
///
/// let errors = schema
///     .check(&Value::map([("x", Value::Null), ("z", Value::Int(3))]))
///     .unwrap()
///     .into_result()
///     .unwrap_err();
///
/// let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
/// assert_eq!(codes, vec!["invalid_type", "missing_key", "forbidden_key"]);
/// assert_eq!(errors.first().context.to_vec(), vec![PathSegment::key("x")]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyedSchema<S: KeyedShape> {
    schema: IndexMap<String, Validator>,
    nullable: bool,
    minlen: Option<usize>,
    maxlen: Option<usize>,
    extra: Option<Box<(Validator, Validator)>>,
    defaults: IndexMap<String, DefaultValue>,
    optional: BTreeSet<String>,
    dispose: BTreeSet<String>,
    multikeys: BTreeSet<String>,
    shape: PhantomData<S>,
}

impl<S: KeyedShape> KeyedSchema<S> {
    /// Creates a mapping schema with no declared keys.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Declares a required key.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Validator>) -> Self {
        self.schema.insert(name.into(), schema.into());
        self
    }

    /// Declares a key that may be absent.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, SchemaLike, Value};
    ///
    /// let schema = Schema::dict().optional("nickname", Schema::string());
    ///
    /// assert!(schema
    ///     .check(&Value::map(Vec::<(Value, Value)>::new()))
    ///     .unwrap()
    ///     .is_success());
    /// ```
    pub fn optional(mut self, name: impl Into<String>, schema: impl Into<Validator>) -> Self {
        let name = name.into();
        self.optional.insert(name.clone());
        self.schema.insert(name, schema.into());
        self
    }

    /// Declares a key with a literal default.
    ///
    /// The default is cloned for every call and validated by `schema` like
    /// any input value, so nested defaults are filled in as well.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, SchemaLike, Value};
    ///
    /// let inner = Schema::dict().default("y", Schema::integer(), 1);
    /// let schema = Schema::dict().default("x", inner, Value::map(Vec::<(Value, Value)>::new()));
    ///
    /// let result = schema.check(&Value::map(Vec::<(Value, Value)>::new())).unwrap();
    /// assert_eq!(
    ///     result.into_result().unwrap(),
    ///     Value::map([("x", Value::map([("y", 1)]))])
    /// );
    /// ```
    pub fn default(
        mut self,
        name: impl Into<String>,
        schema: impl Into<Validator>,
        value: impl Into<Value>,
    ) -> Self {
        let name = name.into();
        self.defaults
            .insert(name.clone(), DefaultValue::Literal(value.into()));
        self.schema.insert(name, schema.into());
        self
    }

    /// Declares a key whose default is produced by `factory` on every call.
    pub fn default_with(
        mut self,
        name: impl Into<String>,
        schema: impl Into<Validator>,
        factory: Factory,
    ) -> Self {
        let name = name.into();
        self.defaults
            .insert(name.clone(), DefaultValue::Factory(factory));
        self.schema.insert(name, schema.into());
        self
    }

    /// Validates undeclared keys and their values instead of rejecting them.
    pub fn extra(mut self, key: impl Into<Validator>, value: impl Into<Validator>) -> Self {
        self.extra = Some(Box::new((key.into(), value.into())));
        self
    }

    /// Silently drops the undeclared key `name`.
    pub fn dispose(mut self, name: impl Into<String>) -> Self {
        self.dispose.insert(name.into());
        self
    }

    /// Accepts null and returns it unchanged.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Adds a minimum size constraint on the validated result.
    pub fn min_len(mut self, len: usize) -> Self {
        self.minlen = Some(len);
        self
    }

    /// Adds a maximum size constraint on the validated result.
    pub fn max_len(mut self, len: usize) -> Self {
        self.maxlen = Some(len);
        self
    }

    /// Returns the declared keys and their validators.
    pub fn fields(&self) -> &IndexMap<String, Validator> {
        &self.schema
    }

    fn group(&self, pairs: &[(Value, Value)]) -> Map {
        let mut grouped = Map::new();
        for (key, value) in pairs {
            if key
                .as_str()
                .is_some_and(|name| self.multikeys.contains(name))
            {
                let slot = grouped
                    .entry(key.clone())
                    .or_insert_with(|| Value::List(Vec::new()));
                if let Value::List(items) = slot {
                    items.push(value.clone());
                }
            } else {
                grouped.insert(key.clone(), value.clone());
            }
        }
        grouped
    }

    pub(crate) fn load(params: &mut Params<'_>) -> Result<Self, LoadError> {
        let schema = params.validator_map("schema")?.unwrap_or_default();

        let extra = match params.validators("extra")? {
            None => None,
            Some(pair) => match <[Validator; 2]>::try_from(pair) {
                Ok([key, value]) => Some(Box::new((key, value))),
                Err(_) => {
                    return Err(ContractError::invalid(
                        S::CLASS,
                        "extra",
                        "expected a key validator and a value validator",
                    )
                    .into())
                }
            },
        };

        let mut defaults: IndexMap<String, DefaultValue> = params
            .raw_map("defaults")?
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name, DefaultValue::Literal(value)))
            .collect();
        for (name, factory) in params.string_map("default_factories")?.unwrap_or_default() {
            let factory = params.registry().factory(&factory)?;
            defaults.insert(name, DefaultValue::Factory(factory));
        }

        // Only multi-valued input has repeated keys to batch.
        let multikeys = if S::MULTI {
            params.names("multikeys")?.into_iter().collect()
        } else {
            BTreeSet::new()
        };

        Ok(Self {
            schema,
            nullable: params.flag("nullable")?,
            minlen: params.length("minlen")?,
            maxlen: params.length("maxlen")?,
            extra,
            defaults,
            optional: params.names("optional")?.into_iter().collect(),
            dispose: params.names("dispose")?.into_iter().collect(),
            multikeys,
            shape: PhantomData,
        })
    }
}

impl MappingSchema {
    /// Collects every value of a repeated key in multi-valued input into a
    /// list.
    pub fn multikey(mut self, name: impl Into<String>) -> Self {
        self.multikeys.insert(name.into());
        self
    }
}

impl<S: KeyedShape> SchemaLike for KeyedSchema<S> {
    const CLASS: &'static str = S::CLASS;

    fn validate(&self, value: &Value, context: &mut Context) -> Outcome {
        if value.is_null() && self.nullable {
            return Ok(Validation::Success(Value::Null));
        }
        let grouped;
        let input = match value {
            Value::Map(map) => map,
            Value::MultiMap(pairs) if S::MULTI => {
                grouped = self.group(pairs);
                &grouped
            }
            _ => return settle(Err(ValidationError::invalid_type(S::EXPECTED, value))),
        };

        let mut result = Map::with_capacity(input.len());
        let mut errors = Vec::new();
        let mut present = HashSet::new();

        for (key, item) in input {
            let declared = key
                .as_str()
                .and_then(|name| self.schema.get_key_value(name));
            if let Some((name, validator)) = declared {
                present.insert(name.as_str());
                match validator.validate(item, context)? {
                    Validation::Success(v) => {
                        result.insert(key.clone(), v);
                    }
                    Validation::Failure(e) => {
                        errors.extend(e.add_context(PathSegment::Key(key.clone())))
                    }
                }
            } else if let Some(extra) = &self.extra {
                let (key_validator, value_validator) = extra.as_ref();
                let validated_key = key_validator.validate(key, context)?;
                let validated_value = value_validator.validate(item, context)?;
                match (validated_key, validated_value) {
                    (Validation::Success(k), Validation::Success(v)) => {
                        result.insert(k, v);
                    }
                    (k, v) => {
                        if let Validation::Failure(e) = k {
                            errors.extend(
                                e.add_context(PathSegment::ExtraKey)
                                    .add_context(PathSegment::Key(key.clone())),
                            );
                        }
                        if let Validation::Failure(e) = v {
                            errors.extend(
                                e.add_context(PathSegment::ExtraValue)
                                    .add_context(PathSegment::Key(key.clone())),
                            );
                        }
                    }
                }
            } else if key.as_str().is_some_and(|name| self.dispose.contains(name)) {
                continue;
            } else {
                errors.push(
                    ValidationError::new(ErrorKind::ForbiddenKey { key: key.clone() })
                        .add_context(PathSegment::Key(key.clone())),
                );
            }
        }

        for (name, validator) in &self.schema {
            let key = Value::from(name.as_str());
            if present.contains(name.as_str()) || result.contains_key(&key) {
                continue;
            }
            if let Some(default) = self.defaults.get(name) {
                match validator.validate(&default.produce(), context)? {
                    Validation::Success(v) => {
                        result.insert(key, v);
                    }
                    Validation::Failure(e) => errors.extend(e.add_context(PathSegment::Key(key))),
                }
            } else if !self.optional.contains(name) {
                errors.push(
                    ValidationError::new(ErrorKind::MissingKey { key: key.clone() })
                        .add_context(PathSegment::Key(key)),
                );
            }
        }

        if let Some(mut errors) = SchemaError::new(errors) {
            errors.sort();
            return Ok(Validation::Failure(errors.into()));
        }

        settle(check_length(self.minlen, self.maxlen, result.len()).map(|()| Value::Map(result)))
    }

    fn dump_params(&self, params: &mut Map) {
        let schema = self
            .schema
            .iter()
            .map(|(name, validator)| (Value::from(name.as_str()), validator.dump()));
        dump::put(params, "schema", Value::Map(schema.collect()));
        dump::put_flag(params, "nullable", self.nullable);
        dump::put_opt(params, "minlen", self.minlen);
        dump::put_opt(params, "maxlen", self.maxlen);
        if let Some(extra) = &self.extra {
            dump::put(
                params,
                "extra",
                Value::tuple([extra.0.dump(), extra.1.dump()]),
            );
        }

        let mut literals = Map::new();
        let mut factories = Map::new();
        for (name, default) in &self.defaults {
            let name = Value::from(name.as_str());
            match default {
                DefaultValue::Literal(value) => {
                    literals.insert(name, value.clone());
                }
                DefaultValue::Factory(factory) => {
                    factories.insert(name, Value::from(factory.name()));
                }
            }
        }
        if !literals.is_empty() {
            dump::put(params, "defaults", Value::Map(literals));
        }
        if !factories.is_empty() {
            dump::put(params, "default_factories", Value::Map(factories));
        }

        for (name, keys) in [
            ("optional", &self.optional),
            ("dispose", &self.dispose),
            ("multikeys", &self.multikeys),
        ] {
            if !keys.is_empty() {
                dump::put(params, name, Value::list(keys.iter().map(String::as_str)));
            }
        }
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for validator in self.schema.values() {
            validator.collect_refs(refs);
        }
        if let Some(extra) = &self.extra {
            extra.0.collect_refs(refs);
            extra.1.collect_refs(refs);
        }
    }
}
