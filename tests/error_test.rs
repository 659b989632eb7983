//! Integration tests for error aggregation, lookup and rendering.

use stillwater::prelude::*;
use vouch::{
    ErrorKind, Invalid, Path, PathSegment, Schema, SchemaError, SchemaLike, ValidationError, Value,
    ValueKind,
};

fn missing(key: &str) -> ValidationError {
    ValidationError::new(ErrorKind::MissingKey {
        key: Value::from(key),
    })
    .add_context(PathSegment::key(key))
}

#[test]
fn test_schema_error_requires_errors() {
    assert!(SchemaError::new(Vec::new()).is_none());

    let errors = SchemaError::new(vec![missing("a"), missing("b")]).unwrap();
    assert_eq!(errors.len(), 2);
    assert!(!errors.is_empty());
    assert_eq!(errors[1].context.to_string(), "b");
    assert!(errors.get(2).is_none());
}

#[test]
fn test_combine_keeps_order() {
    let left = SchemaError::single(missing("b"));
    let right = SchemaError::new(vec![missing("a"), missing("c")]).unwrap();

    let combined = left.combine(right);
    let paths: Vec<_> = combined.iter().map(|e| e.context.to_string()).collect();
    assert_eq!(paths, vec!["b", "a", "c"]);
}

#[test]
fn test_invalid_combine_flattens() {
    let single = Invalid::from(missing("x"));
    let many = Invalid::from(SchemaError::new(vec![missing("y"), missing("z")]).unwrap());

    let combined = single.combine(many);
    assert!(combined.as_schema().is_some());
    assert_eq!(combined.len(), 3);
    assert_eq!(combined.into_errors().len(), 3);
}

#[test]
fn test_sort_is_stable_by_path() {
    let mut errors = SchemaError::new(vec![
        missing("b"),
        ValidationError::new(ErrorKind::MinLength {
            expected: 1,
            actual: 0,
        })
        .add_context(PathSegment::Index(0)),
        ValidationError::new(ErrorKind::MaxLength {
            expected: 1,
            actual: 2,
        })
        .add_context(PathSegment::key("a")),
        ValidationError::new(ErrorKind::MinLength {
            expected: 3,
            actual: 2,
        })
        .add_context(PathSegment::key("a")),
    ])
    .unwrap();

    errors.sort();
    let codes: Vec<_> = errors
        .iter()
        .map(|e| (e.context.to_string(), e.code()))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("[0]".to_string(), "min_length"),
            ("a".to_string(), "max_length"),
            ("a".to_string(), "min_length"),
            ("b".to_string(), "missing_key"),
        ]
    );
}

#[test]
fn test_lookup_by_path_and_code() {
    let schema = Schema::dict()
        .field("name", Schema::string().min_len(1))
        .field("age", Schema::integer().min(0))
        .field("email", Schema::string());

    let errors = schema
        .check(&Value::map([("name", Value::from("")), ("age", Value::Int(-5))]))
        .unwrap()
        .into_result()
        .unwrap_err()
        .into_schema();

    assert_eq!(errors.len(), 3);
    let at_age = errors.at_path(&Path::from(vec![PathSegment::key("age")]));
    assert_eq!(at_age.len(), 1);
    assert_eq!(at_age[0].code(), "min_value");
    assert_eq!(errors.with_code("missing_key").len(), 1);
    assert_eq!(errors.with_code("pattern_match").len(), 0);
}

#[test]
fn test_display() {
    let error = ValidationError::new(ErrorKind::InvalidType {
        expected: ValueKind::Str,
        actual: ValueKind::Int,
    })
    .add_context(PathSegment::key("email"))
    .add_context(PathSegment::Index(0))
    .add_context(PathSegment::key("users"));
    assert_eq!(error.to_string(), "users[0].email: expected str, got int");

    let errors = SchemaError::new(vec![missing("a"), error]).unwrap();
    assert_eq!(
        errors.to_string(),
        "Validation failed with 2 error(s):\n  1. a: required key \"a\" is missing\n  2. users[0].email: expected str, got int\n"
    );
}

#[test]
fn test_invalid_add_context_keeps_variant() {
    let single = Invalid::from(missing("x")).add_context(PathSegment::Step(2));
    assert!(single.as_error().is_some());
    assert_eq!(single.first().context.to_string(), "<step 2>.x");
}
