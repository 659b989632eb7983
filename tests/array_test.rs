//! Integration tests for list and tuple validation.

use serde_json::json;
use vouch::{
    ErrorKind, Invalid, Outcome, PathSegment, Schema, SchemaLike, Validator, Value, ValueKind,
};

/// Helper to extract the success value from an outcome
fn unwrap_success(outcome: Outcome) -> Value {
    outcome.unwrap().into_result().unwrap()
}

/// Helper to extract the errors from an outcome
fn unwrap_failure(outcome: Outcome) -> Invalid {
    outcome.unwrap().into_result().unwrap_err()
}

#[test]
fn test_list_of_integers() {
    let schema = Schema::list(Schema::integer());
    assert_eq!(
        unwrap_success(schema.check(&Value::from(json!([1, 2, 3])))),
        Value::list([1, 2, 3])
    );
}

#[test]
fn test_item_errors_are_tagged_with_input_index() {
    let schema = Schema::list(Schema::integer());
    let errors = unwrap_failure(schema.check(&Value::from(json!([1, "2", 3, null]))));

    assert!(errors.as_schema().is_some());
    assert_eq!(errors.len(), 2);

    let first = errors.first();
    assert_eq!(first.context.to_vec(), vec![PathSegment::Index(1)]);
    assert_eq!(
        first.kind,
        ErrorKind::InvalidType {
            expected: ValueKind::Int,
            actual: ValueKind::Str,
        }
    );

    let second = errors.iter().nth(1).unwrap();
    assert_eq!(second.context.to_vec(), vec![PathSegment::Index(3)]);
    assert_eq!(
        second.kind,
        ErrorKind::InvalidType {
            expected: ValueKind::Int,
            actual: ValueKind::Null,
        }
    );
}

#[test]
fn test_item_errors_never_masked_by_length() {
    let schema = Schema::list(Schema::integer()).min_len(2);
    let errors = unwrap_failure(schema.check(&Value::from(json!(["1", 2]))));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().code(), "invalid_type");
    assert!(errors.iter().all(|e| e.code() != "min_length"));
}

#[test]
fn test_length_limits() {
    let schema = Schema::list(Schema::any()).min_len(1).max_len(2);

    assert_eq!(
        unwrap_failure(schema.check(&Value::list(Vec::<Value>::new())))
            .first()
            .kind,
        ErrorKind::MinLength {
            expected: 1,
            actual: 0
        }
    );
    assert_eq!(
        unwrap_failure(schema.check(&Value::list([1, 2, 3])))
            .first()
            .kind,
        ErrorKind::MaxLength {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_unique_dedups_before_length_check() {
    let schema = Schema::list(Schema::integer().coerce()).unique().max_len(2);

    // "1" and 1 are the same value once validated
    let input = Value::list([Value::from("1"), Value::Int(1), Value::Int(2)]);
    let result = unwrap_success(schema.check(&input));
    assert_eq!(result, Value::list([1, 2]));
}

#[test]
fn test_strings_and_bytes_are_not_sequences() {
    let schema = Schema::list(Schema::string());
    for input in [
        Value::from("abc"),
        Value::bytes(b"abc".to_vec()),
        Value::Int(1),
    ] {
        assert_eq!(
            unwrap_failure(schema.check(&input)).first().kind,
            ErrorKind::InvalidType {
                expected: ValueKind::Sequence,
                actual: input.kind(),
            }
        );
    }
}

#[test]
fn test_nested_list_paths() {
    let schema = Schema::list(Schema::list(Schema::integer()));
    let errors = unwrap_failure(schema.check(&Value::from(json!([[1], [2, "x"]]))));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().context.to_string(), "[1][1]");
}

#[test]
fn test_tuple_validates_positions() {
    let schema = Schema::tuple([
        Validator::from(Schema::string()),
        Schema::integer().into(),
    ])
    .unwrap();

    assert_eq!(
        unwrap_success(schema.check(&Value::from(json!(["a", 1])))),
        Value::tuple([Value::from("a"), Value::Int(1)])
    );

    let errors = unwrap_failure(schema.check(&Value::from(json!([1, "a"]))));
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.first().context.to_vec(), vec![PathSegment::Index(0)]);
}

#[test]
fn test_tuple_length_checked_before_items() {
    let schema = Schema::tuple([Schema::integer(), Schema::integer()]).unwrap();
    let errors = unwrap_failure(schema.check(&Value::from(json!(["a", "b", "c"]))));

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.first().kind,
        ErrorKind::TupleLength {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_nullable_list() {
    let schema = Schema::list(Schema::integer()).nullable();
    assert_eq!(unwrap_success(schema.check(&Value::Null)), Value::Null);
}
