//! Integration tests for recursive schemas built from lazy references.

use serde_json::json;
use vouch::{ErrorKind, Registry, RegistryError, Schema, Value};

fn linked_list(depth: usize) -> Value {
    let mut node = json!({"value": depth});
    for value in (0..depth).rev() {
        node = json!({"value": value, "next": node});
    }
    Value::from(node)
}

fn node_registry(registry: Registry) -> Registry {
    registry
        .add(
            "node",
            Schema::dict()
                .field("value", Schema::integer())
                .optional("next", Schema::lazy_ref("node")),
        )
        .unwrap();
    registry
}

#[test]
fn test_self_reference() {
    let registry = node_registry(Registry::new());

    assert!(registry
        .validate("node", &linked_list(5))
        .unwrap()
        .is_success());

    let broken = Value::from(json!({"value": 0, "next": {"value": 1, "next": {"value": "two"}}}));
    let errors = registry
        .validate("node", &broken)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(errors.first().context.to_string(), "next.next.value");
    assert_eq!(errors.first().code(), "invalid_type");
}

#[test]
fn test_mutual_recursion() {
    let registry = Registry::new();
    registry
        .add(
            "tree",
            Schema::dict()
                .field("name", Schema::string())
                .default(
                    "children",
                    Schema::lazy_ref("forest"),
                    Value::list(Vec::<Value>::new()),
                ),
        )
        .unwrap();
    registry
        .add("forest", Schema::list(Schema::lazy_ref("tree")))
        .unwrap();
    assert!(registry.unresolved_refs().is_empty());

    let input = Value::from(json!({
        "name": "root",
        "children": [
            {"name": "a"},
            {"name": "b", "children": [{"name": 3}]}
        ]
    }));
    let errors = registry
        .validate("tree", &input)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.first().context.to_string(),
        "children[1].children[0].name"
    );

    let valid = Value::from(json!({"name": "root", "children": [{"name": "a"}]}));
    let result = registry
        .validate("tree", &valid)
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(
        result,
        Value::from(json!({"name": "root", "children": [{"name": "a", "children": []}]}))
    );
}

#[test]
fn test_registry_depth_limit() {
    let registry = node_registry(Registry::new().with_max_depth(3));

    assert!(registry
        .validate("node", &linked_list(3))
        .unwrap()
        .is_success());

    let errors = registry
        .validate("node", &linked_list(4))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(
        errors.first().kind,
        ErrorKind::RecursionMaxDepth {
            expected: 3,
            actual: 4
        }
    );
    assert_eq!(errors.first().context.to_string(), "next.next.next.next");
}

#[test]
fn test_per_reference_depth_limit() {
    let registry = Registry::new();
    registry
        .add(
            "node",
            Schema::dict()
                .field("value", Schema::integer())
                .optional("next", Schema::lazy_ref("node").max_depth(2)),
        )
        .unwrap();

    assert!(registry
        .validate("node", &linked_list(2))
        .unwrap()
        .is_success());

    let errors = registry
        .validate("node", &linked_list(3))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(
        errors.first().kind,
        ErrorKind::RecursionMaxDepth {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_sibling_references_do_not_accumulate_depth() {
    let registry = Registry::new();
    registry.add("leaf", Schema::integer()).unwrap();
    registry
        .add(
            "pair",
            Schema::tuple([
                Schema::lazy_ref("leaf").max_depth(1),
                Schema::lazy_ref("leaf").max_depth(1),
            ])
            .unwrap(),
        )
        .unwrap();

    assert!(registry
        .validate("pair", &Value::list([1, 2]))
        .unwrap()
        .is_success());
}

#[test]
fn test_unregistered_alias_is_a_configuration_error() {
    let registry = Registry::new();
    registry
        .add("wrapper", Schema::list(Schema::lazy_ref("missing")))
        .unwrap();

    assert_eq!(registry.unresolved_refs(), vec!["missing"]);
    assert_eq!(
        registry.validate("wrapper", &Value::list([1])).unwrap_err(),
        RegistryError::NotRegistered("missing".to_string())
    );

    // an empty list never reaches the reference
    assert!(registry
        .validate("wrapper", &Value::list(Vec::<Value>::new()))
        .unwrap()
        .is_success());
}
