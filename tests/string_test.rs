//! Integration tests for text and byte string validation.

use serde_json::json;
use vouch::{ContractError, ErrorKind, Invalid, Outcome, Schema, SchemaLike, Value, ValueKind};

/// Helper to extract the success value from an outcome
fn unwrap_success(outcome: Outcome) -> Value {
    outcome.unwrap().into_result().unwrap()
}

/// Helper to extract the errors from an outcome
fn unwrap_failure(outcome: Outcome) -> Invalid {
    outcome.unwrap().into_result().unwrap_err()
}

#[test]
fn test_unconstrained_string_accepts_any_text() {
    let schema = Schema::string();
    for text in ["", "hello", "with spaces", "ünïcödé"] {
        assert_eq!(
            unwrap_success(schema.check(&Value::from(text))),
            Value::from(text)
        );
    }
}

#[test]
fn test_string_rejects_null_by_default() {
    let errors = unwrap_failure(Schema::string().check(&Value::from(json!(null))));
    assert_eq!(
        errors.first().kind,
        ErrorKind::InvalidType {
            expected: ValueKind::Str,
            actual: ValueKind::Null,
        }
    );
    assert!(errors.first().context.is_root());
}

#[test]
fn test_nullable_string_returns_null() {
    let schema = Schema::string().nullable().min_len(3);
    assert_eq!(unwrap_success(schema.check(&Value::Null)), Value::Null);
}

#[test]
fn test_string_rejects_other_types() {
    let schema = Schema::string();
    assert_eq!(
        unwrap_failure(schema.check(&Value::Int(5))).first().code(),
        "invalid_type"
    );
    assert_eq!(
        unwrap_failure(schema.check(&Value::bytes(b"abc".to_vec())))
            .first()
            .code(),
        "invalid_type"
    );
}

#[test]
fn test_min_and_max_length() {
    let schema = Schema::string().min_len(2).max_len(5);

    assert_eq!(
        unwrap_failure(schema.check(&Value::from("a"))).first().kind,
        ErrorKind::MinLength {
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(
        unwrap_failure(schema.check(&Value::from("abcdef")))
            .first()
            .kind,
        ErrorKind::MaxLength {
            expected: 5,
            actual: 6
        }
    );
    assert!(schema.check(&Value::from("abc")).unwrap().is_success());
}

#[test]
fn test_length_counts_characters() {
    let schema = Schema::string().max_len(4);
    assert!(schema.check(&Value::from("café")).unwrap().is_success());
}

#[test]
fn test_decode_failure_reports_encoding_and_bytes() {
    let schema = Schema::string().encoding("utf-8").unwrap();
    // "café" encoded as latin-1
    let latin1 = vec![b'c', b'a', b'f', 0xE9];

    let errors = unwrap_failure(schema.check(&Value::bytes(latin1.clone())));
    assert_eq!(
        errors.first().kind,
        ErrorKind::StrDecode {
            expected: "utf-8".to_string(),
            actual: latin1,
        }
    );
}

#[test]
fn test_decode_success() {
    let utf8 = Schema::string().encoding("utf-8").unwrap();
    assert_eq!(
        unwrap_success(utf8.check(&Value::bytes("café".as_bytes().to_vec()))),
        Value::from("café")
    );

    let latin1 = Schema::string().encoding("latin-1").unwrap();
    assert_eq!(
        unwrap_success(latin1.check(&Value::bytes(vec![b'c', b'a', b'f', 0xE9]))),
        Value::from("café")
    );

    let ascii = Schema::string().encoding("ascii").unwrap();
    assert_eq!(
        unwrap_failure(ascii.check(&Value::bytes("café".as_bytes().to_vec())))
            .first()
            .code(),
        "str_decode"
    );
}

#[test]
fn test_unsupported_encoding_is_a_contract_error() {
    assert!(matches!(
        Schema::string().encoding("klingon"),
        Err(ContractError::Invalid { .. })
    ));
}

#[test]
fn test_pattern_is_anchored_at_start() {
    let schema = Schema::string().pattern(r"[a-z]+").unwrap();

    assert!(schema.check(&Value::from("abc123")).unwrap().is_success());
    assert_eq!(
        unwrap_failure(schema.check(&Value::from("123abc")))
            .first()
            .kind,
        ErrorKind::PatternMatch {
            expected: "[a-z]+".to_string(),
            actual: "123abc".to_string(),
        }
    );
}

#[test]
fn test_invalid_pattern_is_a_contract_error() {
    assert!(Schema::string().pattern("[unclosed").is_err());
}

#[test]
fn test_options() {
    let schema = Schema::string().options(["red", "green"]).unwrap();

    assert!(schema.check(&Value::from("red")).unwrap().is_success());
    let errors = unwrap_failure(schema.check(&Value::from("blue")));
    assert_eq!(errors.first().code(), "options");
    assert_eq!(
        errors.first().to_string(),
        "(root): \"blue\" is not one of [\"green\", \"red\"]"
    );

    assert!(matches!(
        Schema::string().options(Vec::<String>::new()),
        Err(ContractError::Empty { .. })
    ));
}

#[test]
fn test_only_first_violated_constraint_is_reported() {
    let schema = Schema::string()
        .min_len(5)
        .pattern(r"\d")
        .unwrap()
        .options(["12345"])
        .unwrap();

    let errors = unwrap_failure(schema.check(&Value::from("ab")));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().code(), "min_length");

    let errors = unwrap_failure(schema.check(&Value::from("abcdef")));
    assert_eq!(errors.first().code(), "pattern_match");

    let errors = unwrap_failure(schema.check(&Value::from("99999")));
    assert_eq!(errors.first().code(), "options");
}

#[test]
fn test_bytes() {
    let schema = Schema::bytes().min_len(1).max_len(3);

    assert!(schema
        .check(&Value::bytes(vec![1, 2]))
        .unwrap()
        .is_success());
    assert_eq!(
        unwrap_failure(schema.check(&Value::bytes(vec![1, 2, 3, 4])))
            .first()
            .kind,
        ErrorKind::MaxLength {
            expected: 3,
            actual: 4
        }
    );
    assert_eq!(
        unwrap_failure(schema.check(&Value::from("ab")))
            .first()
            .kind,
        ErrorKind::InvalidType {
            expected: ValueKind::Bytes,
            actual: ValueKind::Str,
        }
    );
}
