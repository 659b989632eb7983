//! Error types.
//!
//! Data errors ([`ValidationError`], [`SchemaError`], [`Invalid`]) describe
//! values that do not conform to a schema and are always recoverable.
//! [`ContractError`] describes a schema that was configured incorrectly.

mod contract_error;
mod schema_error;
mod validation_error;

pub use contract_error::ContractError;
pub use schema_error::{Invalid, SchemaError};
pub use validation_error::{ErrorKind, ValidationError};
