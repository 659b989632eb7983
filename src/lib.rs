//! # Vouch
//!
//! Composable validators that check a value, return its canonical form, and
//! accumulate ALL violations with the path at which each one occurred.
//!
//! ## Overview
//!
//! A validator is a tree of nodes: leaves check scalars (integers, strings,
//! dates, ...), containers check lists, tuples and mappings item by item, and
//! combinators chain or choose between validators. Errors found anywhere in
//! the tree are collected through stillwater's `Validation` type rather than
//! stopping at the first one, and each error carries the path to the
//! offending value (e.g. `users[0].email`).
//!
//! Validators are plain data: they compare structurally, dump to a
//! [`Value`] tree, load back from one, and can be cloned with parameter
//! overrides. A [`Registry`] names validators so that lazy references can
//! build recursive schemas.
//!
//! ## Core Types
//!
//! - [`Value`]: The dynamic value model validators operate on
//! - [`Schema`]: Entry point for creating validators
//! - [`Validator`]: Any validator node
//! - [`ValidationError`]: A single violation with its [`Path`]
//! - [`SchemaError`]: A non-empty collection of violations
//! - [`Registry`]: Aliases for validators, used by lazy references
//!
//! ## Example
//!
//! ```rust
//! use vouch::{Schema, SchemaLike, Value};
//!
//! let schema = Schema::dict()
//!     .field("name", Schema::string().min_len(1))
//!     .field("tags", Schema::list(Schema::string()).max_len(3));
//!
//! let input = Value::map([
//!     ("name", Value::from("")),
//!     ("tags", Value::list([Value::from("a"), Value::Int(2)])),
//! ]);
//!
//! let errors = schema.check(&input).unwrap().into_result().unwrap_err();
//! let report: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
//! assert_eq!(
//!     report,
//!     vec![
//!         "name: length must be at least 1, got 0",
//!         "tags[1]: expected str, got int",
//!     ]
//! );
//! ```

pub mod error;
pub mod path;
pub mod registry;
pub mod schema;
pub mod validation;
pub mod value;

mod dump;
mod load;

pub use error::{ContractError, ErrorKind, Invalid, SchemaError, ValidationError};
pub use load::{load, load_with, LoadError, Overrides};
pub use path::{Path, PathSegment};
pub use registry::{Registry, RegistryError};
pub use schema::{
    AllOfSchema, AnySchema, BoolSchema, BytesSchema, ConstSchema, DateSchema, DatetimeSchema,
    DefaultValue, DictSchema, DictShape, Factory, FloatSchema, IntSchema, KeyedSchema, KeyedShape,
    LazyRefSchema, ListSchema, MappingSchema, MappingShape, OneOfSchema, Outcome, Schema,
    SchemaLike, StrSchema, TimeSchema, TupleSchema, ValidationResult, Validator,
};
pub use validation::Context;
pub use value::{Map, Value, ValueKind};
