//! Integration tests for AllOf and OneOf.

use vouch::{
    ContractError, ErrorKind, Invalid, Outcome, PathSegment, Schema, SchemaLike, Validator, Value,
};

fn unwrap_success(outcome: Outcome) -> Value {
    outcome.unwrap().into_result().unwrap()
}

fn unwrap_failure(outcome: Outcome) -> Invalid {
    outcome.unwrap().into_result().unwrap_err()
}

#[test]
fn test_all_of_reports_first_failing_step() {
    let schema = Schema::all_of([Schema::integer().min(0), Schema::integer().max(10)]).unwrap();

    let errors = unwrap_failure(schema.check(&Value::Int(-1)));
    assert!(errors.as_error().is_some());
    assert_eq!(errors.first().context.to_vec(), vec![PathSegment::Step(0)]);
    assert_eq!(
        errors.first().kind,
        ErrorKind::MinValue {
            expected: Value::Int(0),
            actual: Value::Int(-1),
        }
    );

    let errors = unwrap_failure(schema.check(&Value::Int(11)));
    assert_eq!(errors.first().context.to_vec(), vec![PathSegment::Step(1)]);
    assert_eq!(errors.first().code(), "max_value");

    assert_eq!(unwrap_success(schema.check(&Value::Int(5))), Value::Int(5));
}

#[test]
fn test_all_of_feeds_output_forward() {
    // the first step converts the string, the second sees an int
    let schema = Schema::all_of([Schema::integer().coerce(), Schema::integer().min(3)]).unwrap();
    assert_eq!(
        unwrap_success(schema.check(&Value::from("7"))),
        Value::Int(7)
    );
    assert_eq!(
        unwrap_failure(schema.check(&Value::from("2")))
            .first()
            .context
            .to_string(),
        "<step 1>"
    );
}

#[test]
fn test_one_of_first_success_wins() {
    let schema = Schema::one_of([
        Validator::from(Schema::integer()),
        Schema::integer().coerce().into(),
    ])
    .unwrap();

    assert_eq!(unwrap_success(schema.check(&Value::Int(4))), Value::Int(4));
    assert_eq!(
        unwrap_success(schema.check(&Value::from("4"))),
        Value::Int(4)
    );
}

#[test]
fn test_one_of_collects_every_branch_error_in_order() {
    let schema = Schema::one_of([
        Schema::integer().options([1, 2, 3]).unwrap(),
        Schema::integer().min(10),
    ])
    .unwrap();

    let errors = unwrap_failure(schema.check(&Value::Int(9)));
    assert!(errors.as_schema().is_some());
    assert_eq!(errors.len(), 2);

    let steps: Vec<_> = errors.iter().map(|e| e.context.to_vec()).collect();
    assert_eq!(
        steps,
        vec![vec![PathSegment::Step(0)], vec![PathSegment::Step(1)]]
    );
    let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
    assert_eq!(codes, vec!["options", "min_value"]);
}

#[test]
fn test_one_of_keeps_nested_branch_errors() {
    let schema = Schema::one_of([
        Validator::from(Schema::list(Schema::integer())),
        Schema::string().into(),
    ])
    .unwrap();

    let input = Value::list([Value::Int(1), Value::from("x"), Value::Null]);
    let errors = unwrap_failure(schema.check(&input));
    let paths: Vec<_> = errors.iter().map(|e| e.context.to_string()).collect();
    assert_eq!(paths, vec!["<step 0>[1]", "<step 0>[2]", "<step 1>"]);
}

#[test]
fn test_combinators_inside_containers() {
    let schema = Schema::dict().field(
        "port",
        Schema::all_of([
            Schema::integer().coerce().min(1),
            Schema::integer().max(65535),
        ])
        .unwrap(),
    );
    let errors = unwrap_failure(schema.check(&Value::map([("port", "70000")])));
    assert_eq!(errors.first().context.to_string(), "port<step 1>");
}

#[test]
fn test_empty_steps_are_rejected() {
    assert!(matches!(
        Schema::all_of(Vec::<Validator>::new()),
        Err(ContractError::Empty { .. })
    ));
    assert!(matches!(
        Schema::one_of(Vec::<Validator>::new()),
        Err(ContractError::Empty { .. })
    ));
}
