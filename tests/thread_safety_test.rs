//! Tests for sharing validators and registries across threads.

use serde_json::json;
use std::sync::Arc;
use std::thread;
use vouch::{Context, Registry, Schema, Validator, Value};

#[test]
fn test_concurrent_validation() {
    let registry = Arc::new(Registry::new());

    registry
        .add(
            "user",
            Schema::dict()
                .field("name", Schema::string())
                .field("age", Schema::integer().min(1)),
        )
        .unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let result = registry
                    .validate(
                        "user",
                        &Value::from(json!({
                            "name": format!("User{}", i),
                            "age": 20 + i
                        })),
                    )
                    .unwrap();
                assert!(result.is_success());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_shared_validator_with_own_contexts() {
    let registry = Registry::new();
    registry.add("id", Schema::integer().min(1)).unwrap();
    let validator = Arc::new(Validator::from(Schema::list(Schema::lazy_ref("id")).min_len(1)));

    let handles: Vec<_> = (0..8)
        .map(|i: i64| {
            let validator = Arc::clone(&validator);
            let registry = registry.clone();
            thread::spawn(move || {
                let mut context = Context::new(registry);
                let outcome = validator
                    .validate(&Value::list([i, i + 1]), &mut context)
                    .unwrap();
                assert_eq!(context.depth(), 0);
                // only the first thread submits a zero id
                assert_eq!(outcome.is_failure(), i == 0);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registration_and_lookup() {
    let registry = Registry::new();

    let writers: Vec<_> = (0..5)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .add(format!("field{}", i), Schema::string().max_len(i))
                    .unwrap();
            })
        })
        .collect();
    for handle in writers {
        handle.join().unwrap();
    }

    let readers: Vec<_> = (0..5)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                let alias = format!("field{}", i);
                let result = registry.validate(&alias, &Value::from("abc")).unwrap();
                assert_eq!(result.is_success(), i >= 3);
            })
        })
        .collect();
    for handle in readers {
        handle.join().unwrap();
    }

    assert_eq!(registry.aliases().len(), 5);
}

#[test]
fn test_deep_recursion_in_parallel() {
    let registry = Registry::new().with_max_depth(20);
    registry
        .add(
            "node",
            Schema::dict()
                .field("value", Schema::integer())
                .optional("next", Schema::lazy_ref("node")),
        )
        .unwrap();

    let handles: Vec<_> = [5usize, 25, 10, 30]
        .into_iter()
        .map(|depth| {
            let registry = registry.clone();
            thread::spawn(move || {
                let mut node = json!({"value": 0});
                for _ in 0..depth {
                    node = json!({"value": 0, "next": node});
                }
                let result = registry.validate("node", &Value::from(node)).unwrap();
                assert_eq!(result.is_success(), depth <= 20);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
