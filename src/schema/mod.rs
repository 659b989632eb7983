//! Validator definitions.
//!
//! This module provides one struct per validator kind, the [`Validator`] sum
//! type that holds any of them, and the [`Schema`] entry point. Every
//! validator returns the canonical form of its input and accumulates all
//! errors rather than short-circuiting on the first failure.
//!
//! # Example
//!
//! ```rust
//! use vouch::{Schema, SchemaLike, Value};
//!
//! let schema = Schema::string().min_len(1).max_len(100);
//!
//! let result = schema.check(&Value::from("hello")).unwrap();
//! assert!(result.is_success());
//! ```

mod array;
mod combinators;
mod numeric;
mod object;
mod ref_schema;
mod scalar;
mod string;
mod temporal;
mod traits;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ContractError;
use crate::load::{self, LoadError, Overrides};
use crate::registry::Registry;
use crate::validation::Context;
use crate::value::{Map, Value};

pub use array::{ListSchema, TupleSchema};
pub use combinators::{AllOfSchema, OneOfSchema};
pub use numeric::{FloatSchema, IntSchema};
pub use object::{
    DefaultValue, DictSchema, DictShape, Factory, KeyedSchema, KeyedShape, MappingSchema,
    MappingShape,
};
pub use ref_schema::LazyRefSchema;
pub use scalar::{AnySchema, BoolSchema, ConstSchema};
pub use string::{BytesSchema, StrSchema};
pub use temporal::{DateSchema, DatetimeSchema, TimeSchema};
pub use traits::{Outcome, SchemaLike, ValidationResult};

/// Key of the class discriminator in dump trees.
pub(crate) const CLASS_KEY: &str = "__class__";

/// Any validator node.
///
/// Equality is structural, `Clone` is a deep copy and hashing goes through
/// the dump tree, so two validators built the same way are interchangeable.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    Int(IntSchema),
    Float(FloatSchema),
    Str(StrSchema),
    Bytes(BytesSchema),
    Bool(BoolSchema),
    Date(DateSchema),
    Time(TimeSchema),
    Datetime(DatetimeSchema),
    Any(AnySchema),
    Const(ConstSchema),
    List(ListSchema),
    Tuple(TupleSchema),
    Dict(DictSchema),
    Mapping(MappingSchema),
    AllOf(AllOfSchema),
    OneOf(OneOfSchema),
    LazyRef(LazyRefSchema),
}

macro_rules! dispatch {
    ($validator:expr, $node:ident => $body:expr) => {
        match $validator {
            Validator::Int($node) => $body,
            Validator::Float($node) => $body,
            Validator::Str($node) => $body,
            Validator::Bytes($node) => $body,
            Validator::Bool($node) => $body,
            Validator::Date($node) => $body,
            Validator::Time($node) => $body,
            Validator::Datetime($node) => $body,
            Validator::Any($node) => $body,
            Validator::Const($node) => $body,
            Validator::List($node) => $body,
            Validator::Tuple($node) => $body,
            Validator::Dict($node) => $body,
            Validator::Mapping($node) => $body,
            Validator::AllOf($node) => $body,
            Validator::OneOf($node) => $body,
            Validator::LazyRef($node) => $body,
        }
    };
}

fn class_of<S: SchemaLike>(_: &S) -> &'static str {
    S::CLASS
}

impl Validator {
    /// Returns the class discriminator, e.g. `"Int"`.
    pub fn class(&self) -> &'static str {
        dispatch!(self, node => class_of(node))
    }

    /// Validates `value`, threading `context` through nested validators.
    pub fn validate(&self, value: &Value, context: &mut Context) -> Outcome {
        dispatch!(self, node => node.validate(value, context))
    }

    /// Validates `value` with a fresh default context.
    pub fn check(&self, value: &Value) -> Outcome {
        self.validate(value, &mut Context::default())
    }

    /// Returns the non-default parameters, without the class discriminator.
    pub fn params(&self) -> Map {
        let mut params = Map::new();
        dispatch!(self, node => node.dump_params(&mut params));
        params
    }

    /// Serializes this validator to a dump tree.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, Validator, Value};
    ///
    /// let tree = Validator::from(Schema::integer().min(0)).dump();
    /// assert_eq!(tree, Value::map([("__class__", Value::from("Int")), ("min", Value::Int(0))]));
    /// ```
    pub fn dump(&self) -> Value {
        let mut tree = Map::new();
        tree.insert(Value::from(CLASS_KEY), Value::from(self.class()));
        tree.extend(self.params());
        Value::Map(tree)
    }

    /// Builds a validator from a dump tree.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` if the tree is malformed, names an unknown class,
    /// breaks a parameter contract or refers to an unregistered alias.
    pub fn load(tree: &Value, registry: &Registry) -> Result<Self, LoadError> {
        load::load(tree, registry)
    }

    /// Copies this validator with parameter overrides applied.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Overrides, Registry, Schema, Validator, Value};
    ///
    /// let registry = Registry::new();
    /// let original = Validator::from(Schema::integer().min(0).max(10));
    ///
    /// let overrides = Overrides::new()
    ///     .update("/", Value::map([("min", 5)]))
    ///     .unwrap()
    ///     .unset("/", ["max"])
    ///     .unwrap();
    /// let copy = original.clone_with(&overrides, &registry).unwrap();
    ///
    /// assert_eq!(copy, Validator::from(Schema::integer().min(5)));
    /// ```
    pub fn clone_with(
        &self,
        overrides: &Overrides,
        registry: &Registry,
    ) -> Result<Self, LoadError> {
        load::load_with(&self.dump(), overrides, registry)
    }

    /// Collects the aliases of every lazy reference reachable from here.
    pub fn collect_refs(&self, refs: &mut Vec<String>) {
        dispatch!(self, node => node.collect_refs(refs))
    }
}

impl Eq for Validator {}

impl Hash for Validator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dump().hash(state);
    }
}

fn render_seq(items: &[Value], open: &str, close: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(open)?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        render(item, f)?;
    }
    f.write_str(close)
}

/// Renders a dump tree, showing nested validators as `Class(param=value)`.
fn render(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Map(map) => {
            if let Some(Value::Str(class)) = map.get(&Value::from(CLASS_KEY)) {
                write!(f, "{}(", class)?;
                let params = map
                    .iter()
                    .filter(|(key, _)| key.as_str() != Some(CLASS_KEY));
                for (idx, (key, param)) in params.enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}=", key.key_string())?;
                    render(param, f)?;
                }
                return f.write_str(")");
            }
            f.write_str("{")?;
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                render(key, f)?;
                f.write_str(": ")?;
                render(item, f)?;
            }
            f.write_str("}")
        }
        Value::List(items) => render_seq(items, "[", "]", f),
        Value::Tuple(items) => render_seq(items, "(", ")", f),
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(&self.dump(), f)
    }
}

macro_rules! impl_from_schema {
    ($($variant:ident($schema:ty)),* $(,)?) => {
        $(
            impl From<$schema> for Validator {
                fn from(schema: $schema) -> Self {
                    Validator::$variant(schema)
                }
            }
        )*
    };
}

impl_from_schema!(
    Int(IntSchema),
    Float(FloatSchema),
    Str(StrSchema),
    Bytes(BytesSchema),
    Bool(BoolSchema),
    Date(DateSchema),
    Time(TimeSchema),
    Datetime(DatetimeSchema),
    Any(AnySchema),
    Const(ConstSchema),
    List(ListSchema),
    Tuple(TupleSchema),
    Dict(DictSchema),
    Mapping(MappingSchema),
    AllOf(AllOfSchema),
    OneOf(OneOfSchema),
    LazyRef(LazyRefSchema),
);

/// Entry point for creating validators.
///
/// `Schema` provides factory methods for every validator kind. Constraints
/// are added through builder methods; builders whose argument the type system
/// cannot fully check return `Result<_, ContractError>`.
///
/// # Example
///
/// ```rust
/// use vouch::Schema;
///
/// // A string schema with length constraints
/// let name = Schema::string().min_len(1).max_len(100);
///
/// // A string schema with a pattern, checked when built
/// let email = Schema::string().pattern(r"[^@]+@").unwrap();
/// assert!(Schema::string().pattern("(").is_err());
/// ```
///
/// Builders do not register anything. To make a validator reachable by
/// alias, hand it to [`Registry::add`] (or [`Registry::put`] to replace an
/// existing entry); dump trees may do the same through their `alias` and
/// `replace` parameters.
pub struct Schema;

impl Schema {
    /// Creates an integer schema.
    ///
    /// Floats and strings are rejected unless [`coerce`](IntSchema::coerce)
    /// is set.
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
    /// assert!(schema.check(&Value::Float(1.5)).unwrap().is_failure());
    /// ```
    pub fn integer() -> IntSchema {
        IntSchema::new()
    }

    /// Creates a float schema; integers are widened.
    pub fn float() -> FloatSchema {
        FloatSchema::new()
    }

    /// Creates a text schema.
    pub fn string() -> StrSchema {
        StrSchema::new()
    }

    /// Creates a byte string schema.
    pub fn bytes() -> BytesSchema {
        BytesSchema::new()
    }

    /// Creates a boolean schema.
    pub fn boolean() -> BoolSchema {
        BoolSchema::new()
    }

    /// Creates a date schema.
    pub fn date() -> DateSchema {
        DateSchema::new()
    }

    /// Creates a time-of-day schema.
    pub fn time() -> TimeSchema {
        TimeSchema::new()
    }

    /// Creates a date and time schema.
    pub fn datetime() -> DatetimeSchema {
        DatetimeSchema::new()
    }

    /// Creates a schema accepting any non-null value.
    pub fn any() -> AnySchema {
        AnySchema::new()
    }

    /// Creates a schema accepting exactly `value`.
    pub fn constant(value: impl Into<Value>) -> ConstSchema {
        ConstSchema::new(value)
    }

    /// Creates a list schema validating each item with `item`.
    pub fn list(item: impl Into<Validator>) -> ListSchema {
        ListSchema::new(item)
    }

    /// Creates a tuple schema with one validator per position.
    pub fn tuple<V: Into<Validator>>(
        items: impl IntoIterator<Item = V>,
    ) -> Result<TupleSchema, ContractError> {
        TupleSchema::new(items)
    }

    /// Creates a mapping schema.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vouch::{Schema, SchemaLike, Value};
    ///
    /// let schema = Schema::dict()
    ///     .field("name", Schema::string().min_len(1))
    ///     .field("age", Schema::integer().min(0))
    ///     .optional("email", Schema::string())
    ///     .default("role", Schema::string(), "user");
    ///
    /// let result = schema
    ///     .check(&Value::map([("name", Value::from("Alice")), ("age", Value::Int(30))]))
    ///     .unwrap();
    /// assert_eq!(result.into_result().unwrap().get("role"), Some(&Value::from("user")));
    ///
    /// // Missing required key
    /// assert!(schema.check(&Value::map([("name", "Bob")])).unwrap().is_failure());
    /// ```
    pub fn dict() -> DictSchema {
        DictSchema::new()
    }

    /// Creates a mapping schema that also accepts multi-valued mappings.
    pub fn mapping() -> MappingSchema {
        MappingSchema::new()
    }

    /// Creates a pipeline feeding each step's output to the next.
    pub fn all_of<V: Into<Validator>>(
        steps: impl IntoIterator<Item = V>,
    ) -> Result<AllOfSchema, ContractError> {
        AllOfSchema::new(steps)
    }

    /// Creates an alternation returning the first successful step.
    pub fn one_of<V: Into<Validator>>(
        steps: impl IntoIterator<Item = V>,
    ) -> Result<OneOfSchema, ContractError> {
        OneOfSchema::new(steps)
    }

    /// Creates a reference to the validator registered under `alias`.
    pub fn lazy_ref(alias: impl Into<String>) -> LazyRefSchema {
        LazyRefSchema::new(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    #[test]
    fn test_class_names() {
        assert_eq!(Validator::from(Schema::integer()).class(), "Int");
        assert_eq!(Validator::from(Schema::dict()).class(), "Dict");
        assert_eq!(Validator::from(Schema::mapping()).class(), "Mapping");
        assert_eq!(Validator::from(Schema::lazy_ref("x")).class(), "LazyRef");
    }

    #[test]
    fn test_display() {
        assert_eq!(Validator::from(Schema::integer()).to_string(), "Int()");
        assert_eq!(
            Validator::from(Schema::integer().min(0).nullable()).to_string(),
            "Int(nullable=true, min=0)"
        );
        assert_eq!(
            Validator::from(Schema::list(Schema::string())).to_string(),
            "List(item=Str())"
        );
    }

    #[test]
    fn test_equal_validators_hash_equal() {
        let mut set = HashSet::new();
        set.insert(Validator::from(Schema::string().min_len(1)));
        set.insert(Validator::from(Schema::string().min_len(1)));
        set.insert(Validator::from(Schema::string().min_len(2)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_distinct_validators_hash_apart() {
        fn hash_of(validator: &Validator) -> u64 {
            let mut hasher = DefaultHasher::new();
            validator.hash(&mut hasher);
            hasher.finish()
        }

        let hashes: HashSet<u64> = (0..5)
            .map(|min| hash_of(&Validator::from(Schema::integer().min(min))))
            .collect();
        assert_eq!(hashes.len(), 5);

        // same parameters, different class
        assert_ne!(
            hash_of(&Validator::from(Schema::dict())),
            hash_of(&Validator::from(Schema::mapping()))
        );
    }

    #[test]
    fn test_params_exclude_class() {
        let params = Validator::from(Schema::integer().max(3)).params();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(&Value::from("max")), Some(&Value::Int(3)));
    }
}
