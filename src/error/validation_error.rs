//! Single validation failures.

use std::fmt::{self, Display};

use crate::path::{Path, PathSegment};
use crate::value::{Value, ValueKind};

/// What went wrong, with the expected and actual payloads for that kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("expected {expected}, got {actual}")]
    InvalidType {
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("cannot decode {} bytes using {expected}", .actual.len())]
    StrDecode { expected: String, actual: Vec<u8> },

    #[error("length must be at least {expected}, got {actual}")]
    MinLength { expected: usize, actual: usize },

    #[error("length must be at most {expected}, got {actual}")]
    MaxLength { expected: usize, actual: usize },

    #[error("{actual:?} does not match pattern {expected:?}")]
    PatternMatch { expected: String, actual: String },

    #[error("{actual} is not one of {}", Value::List(.expected.clone()))]
    Options { expected: Vec<Value>, actual: Value },

    #[error("value must be at least {expected}, got {actual}")]
    MinValue { expected: Value, actual: Value },

    #[error("value must be at most {expected}, got {actual}")]
    MaxValue { expected: Value, actual: Value },

    #[error("expected {expected}, got {actual}")]
    FloatValue { expected: String, actual: f64 },

    #[error("expected {expected} items, got {actual}")]
    TupleLength { expected: usize, actual: usize },

    #[error("required key {key} is missing")]
    MissingKey { key: Value },

    #[error("key {key} is not allowed")]
    ForbiddenKey { key: Value },

    #[error("{actual:?} does not match format {expected:?}")]
    DatetimeParse { expected: String, actual: String },

    #[error("recursion depth {actual} exceeds limit {expected}")]
    RecursionMaxDepth { expected: usize, actual: usize },
}

impl ErrorKind {
    /// Machine-readable error code (e.g. `min_length`).
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidType { .. } => "invalid_type",
            ErrorKind::StrDecode { .. } => "str_decode",
            ErrorKind::MinLength { .. } => "min_length",
            ErrorKind::MaxLength { .. } => "max_length",
            ErrorKind::PatternMatch { .. } => "pattern_match",
            ErrorKind::Options { .. } => "options",
            ErrorKind::MinValue { .. } => "min_value",
            ErrorKind::MaxValue { .. } => "max_value",
            ErrorKind::FloatValue { .. } => "float_value",
            ErrorKind::TupleLength { .. } => "tuple_length",
            ErrorKind::MissingKey { .. } => "missing_key",
            ErrorKind::ForbiddenKey { .. } => "forbidden_key",
            ErrorKind::DatetimeParse { .. } => "datetime_parse",
            ErrorKind::RecursionMaxDepth { .. } => "recursion_max_depth",
        }
    }
}

/// A single validation error and the path at which it occurred.
///
/// Leaves create errors with an empty path; containers call
/// [`add_context`](Self::add_context) on the way out.
///
/// # Example
///
/// ```rust
/// use vouch::{ErrorKind, PathSegment, ValidationError};
///
/// let error = ValidationError::new(ErrorKind::MinLength { expected: 2, actual: 1 })
///     .add_context(PathSegment::key("name"))
///     .add_context(PathSegment::index(0));
///
/// assert_eq!(error.code(), "min_length");
/// assert_eq!(error.context.to_string(), "[0].name");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong, outermost segment first.
    pub context: Path,
}

impl ValidationError {
    /// Creates an error at the root path.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Path::root(),
        }
    }

    /// Prepends a path segment and returns self for chaining.
    pub fn add_context(mut self, segment: PathSegment) -> Self {
        self.context.push_front(segment);
        self
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub(crate) fn invalid_type(expected: ValueKind, actual: &Value) -> Self {
        Self::new(ErrorKind::InvalidType {
            expected,
            actual: actual.kind(),
        })
    }

    pub(crate) fn min_value(expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        Self::new(ErrorKind::MinValue {
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    pub(crate) fn max_value(expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        Self::new(ErrorKind::MaxValue {
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    pub(crate) fn options(expected: Vec<Value>, actual: impl Into<Value>) -> Self {
        Self::new(ErrorKind::Options {
            expected,
            actual: actual.into(),
        })
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_root() {
            write!(f, "(root): {}", self.kind)
        } else {
            write!(f, "{}: {}", self.context, self.kind)
        }
    }
}

impl std::error::Error for ValidationError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};
