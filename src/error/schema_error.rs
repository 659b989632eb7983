//! Aggregated validation errors.
//!
//! This module provides [`SchemaError`], a non-empty collection of
//! [`ValidationError`]s raised by combinators, and [`Invalid`], the failure
//! side of every validation call.

use std::fmt::{self, Display};
use std::ops::Index;

use stillwater::prelude::*;

use super::validation_error::ValidationError;
use crate::path::{Path, PathSegment};

/// A non-empty collection of validation errors.
///
/// `SchemaError` wraps a `NonEmptyVec<ValidationError>` so a failure always
/// carries at least one error. It has no path of its own: each contained
/// error carries its own context.
///
/// # Combining Errors
///
/// ```rust
/// use vouch::{ErrorKind, SchemaError, ValidationError};
/// use stillwater::prelude::*;
///
/// let missing = |key: &str| ValidationError::new(ErrorKind::MissingKey { key: key.into() });
///
/// let combined = SchemaError::single(missing("name")).combine(SchemaError::single(missing("email")));
/// assert_eq!(combined.len(), 2);
/// assert_eq!(combined[1].code(), "missing_key");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError(NonEmptyVec<ValidationError>);

impl SchemaError {
    /// Creates a `SchemaError` containing a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `SchemaError` from a list of errors, or `None` if it is empty.
    pub fn new(errors: Vec<ValidationError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Creates a `SchemaError` from a `NonEmptyVec` of errors.
    pub fn from_non_empty(errors: NonEmptyVec<ValidationError>) -> Self {
        Self(errors)
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    /// The first error, in collection order.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Returns the error at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&ValidationError> {
        self.0.iter().nth(index)
    }

    /// Converts this collection into a `Vec<ValidationError>`.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }

    /// Sorts the errors by context. The sort is stable, so errors at the same
    /// path keep their relative order.
    pub fn sort(&mut self) {
        let mut errors = self.0.clone().into_vec();
        errors.sort_by(|a, b| a.context.cmp(&b.context));
        if let Some(sorted) = NonEmptyVec::from_vec(errors) {
            self.0 = sorted;
        }
    }

    /// Prepends `segment` to the context of every error.
    pub fn add_context(self, segment: PathSegment) -> Self {
        let head = self.0.head().clone().add_context(segment.clone());
        let tail = self
            .0
            .into_vec()
            .into_iter()
            .skip(1)
            .map(|e| e.add_context(segment.clone()));
        collect_non_empty(head, tail)
    }

    /// Returns all errors at the specified path.
    pub fn at_path(&self, path: &Path) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| &e.context == path).collect()
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.code() == code).collect()
    }
}

fn collect_non_empty(
    head: ValidationError,
    tail: impl Iterator<Item = ValidationError>,
) -> SchemaError {
    SchemaError(tail.fold(NonEmptyVec::singleton(head), |acc, error| {
        acc.combine(NonEmptyVec::singleton(error))
    }))
}

impl Index<usize> for SchemaError {
    type Output = ValidationError;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(error) => error,
            None => panic!(
                "index {} out of range for SchemaError of length {}",
                index,
                self.len()
            ),
        }
    }
}

impl Semigroup for SchemaError {
    fn combine(self, other: Self) -> Self {
        SchemaError(self.0.combine(other.0))
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

impl IntoIterator for SchemaError {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaError {
    type Item = &'a ValidationError;
    type IntoIter = Box<dyn Iterator<Item = &'a ValidationError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

impl From<ValidationError> for SchemaError {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

/// The failure of a validation call.
///
/// Leaves, `AllOf` and container length checks fail with a single
/// [`ValidationError`]; aggregating combinators fail with a [`SchemaError`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Invalid {
    #[error(transparent)]
    Error(ValidationError),
    #[error(transparent)]
    Schema(SchemaError),
}

impl Invalid {
    /// Number of contained errors.
    pub fn len(&self) -> usize {
        match self {
            Invalid::Error(_) => 1,
            Invalid::Schema(errors) => errors.len(),
        }
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over every contained error.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &ValidationError> + '_> {
        match self {
            Invalid::Error(error) => Box::new(std::iter::once(error)),
            Invalid::Schema(errors) => Box::new(errors.iter()),
        }
    }

    /// The first error, in collection order.
    pub fn first(&self) -> &ValidationError {
        match self {
            Invalid::Error(error) => error,
            Invalid::Schema(errors) => errors.first(),
        }
    }

    /// Flattens into a list of errors.
    pub fn into_errors(self) -> Vec<ValidationError> {
        match self {
            Invalid::Error(error) => vec![error],
            Invalid::Schema(errors) => errors.into_vec(),
        }
    }

    /// Prepends `segment` to every contained error, keeping the variant.
    pub fn add_context(self, segment: PathSegment) -> Self {
        match self {
            Invalid::Error(error) => Invalid::Error(error.add_context(segment)),
            Invalid::Schema(errors) => Invalid::Schema(errors.add_context(segment)),
        }
    }

    pub fn as_error(&self) -> Option<&ValidationError> {
        match self {
            Invalid::Error(error) => Some(error),
            Invalid::Schema(_) => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Invalid::Schema(errors) => Some(errors),
            Invalid::Error(_) => None,
        }
    }

    /// Converts into a `SchemaError`, wrapping a single error if needed.
    pub fn into_schema(self) -> SchemaError {
        match self {
            Invalid::Error(error) => SchemaError::single(error),
            Invalid::Schema(errors) => errors,
        }
    }
}

impl From<ValidationError> for Invalid {
    fn from(error: ValidationError) -> Self {
        Invalid::Error(error)
    }
}

impl From<SchemaError> for Invalid {
    fn from(errors: SchemaError) -> Self {
        Invalid::Schema(errors)
    }
}

impl Semigroup for Invalid {
    fn combine(self, other: Self) -> Self {
        Invalid::Schema(self.into_schema().combine(other.into_schema()))
    }
}

impl IntoIterator for Invalid {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_errors().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaError>();
    assert_sync::<SchemaError>();
    assert_send::<Invalid>();
    assert_sync::<Invalid>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::Value;

    fn missing(key: &str) -> ValidationError {
        ValidationError::new(ErrorKind::MissingKey {
            key: Value::from(key),
        })
        .add_context(PathSegment::key(key))
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(SchemaError::new(Vec::new()).is_none());
        let errors = SchemaError::new(vec![missing("a")]).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_sort_by_context_is_stable() {
        let first_at_b = ValidationError::min_value(0, -1).add_context(PathSegment::key("b"));
        let second_at_b = missing("b");
        let mut errors =
            SchemaError::new(vec![first_at_b.clone(), missing("a"), second_at_b.clone()]).unwrap();
        errors.sort();

        assert_eq!(errors[0], missing("a"));
        assert_eq!(errors[1], first_at_b);
        assert_eq!(errors[2], second_at_b);
    }

    #[test]
    fn test_add_context_applies_to_all() {
        let errors = SchemaError::new(vec![missing("a"), missing("b")])
            .unwrap()
            .add_context(PathSegment::Index(4));

        for error in errors.iter() {
            assert_eq!(error.context.first(), Some(&PathSegment::Index(4)));
            assert_eq!(error.context.len(), 2);
        }
    }

    #[test]
    fn test_get_out_of_range() {
        let errors = SchemaError::single(missing("a"));
        assert!(errors.get(1).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_out_of_range_panics() {
        let errors = SchemaError::single(missing("a"));
        let _ = &errors[3];
    }

    #[test]
    fn test_semigroup_associativity() {
        let e1 = SchemaError::single(missing("1"));
        let e2 = SchemaError::single(missing("2"));
        let e3 = SchemaError::single(missing("3"));

        let left = e1.clone().combine(e2.clone()).combine(e3.clone());
        let right = e1.combine(e2.combine(e3));

        assert_eq!(left, right);
    }

    #[test]
    fn test_invalid_combine_yields_schema() {
        let combined = Invalid::from(missing("a")).combine(Invalid::from(missing("b")));
        assert!(combined.as_schema().is_some());
        assert_eq!(combined.len(), 2);
    }

    #[test]
    fn test_invalid_add_context_keeps_variant() {
        let single = Invalid::from(missing("a")).add_context(PathSegment::step(0));
        assert!(single.as_error().is_some());
        assert_eq!(single.first().context.first(), Some(&PathSegment::Step(0)));
    }

    #[test]
    fn test_display() {
        let errors = SchemaError::new(vec![missing("name"), missing("email")]).unwrap();
        let display = errors.to_string();
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("name: required key \"name\" is missing"));
    }

    #[test]
    fn test_filters() {
        let errors = SchemaError::new(vec![
            missing("a"),
            ValidationError::min_value(0, -1).add_context(PathSegment::key("a")),
        ])
        .unwrap();

        let at_a = Path::from(vec![PathSegment::key("a")]);
        assert_eq!(errors.at_path(&at_a).len(), 2);
        assert_eq!(errors.with_code("min_value").len(), 1);
    }
}
