//! # Kind Validation Tests
//!
//! Every declared kind accepts its own shape and rejects the others, both
//! as a top-level type and as a struct field, and nested value types built
//! from named and inline definitions are enforced element by element.

use dagtype_core::Value;
use dagtype_schema::{compile, CompileOptions, Registry, Schema};
use serde_json::json;

fn registry(schema: serde_json::Value) -> Registry {
    compile(&Schema::from_value(schema).unwrap(), CompileOptions::new()).unwrap()
}

fn all_kinds() -> Registry {
    registry(json!({
        "types": {
            "TestString": { "kind": "string" },
            "TestInt": { "kind": "int" },
            "TestFloat": { "kind": "float" },
            "TestBytes": { "kind": "bytes" },
            "TestMap": { "kind": "map" },
            "TestList": { "kind": "list" },
            "TestBool": { "kind": "bool" },
            "TestNull": { "kind": "null" },
            "TestLink": { "kind": "link" }
        }
    }))
}

#[test]
fn test_all_kinds_accept_valid_values() {
    let registry = all_kinds();
    let cases = [
        ("TestString", Value::from("string")),
        ("TestInt", Value::Int(120)),
        ("TestFloat", Value::Float(1.2)),
        ("TestBytes", Value::Bytes(b"asdf".to_vec())),
        ("TestMap", Value::map::<String, _>([])),
        ("TestList", Value::list([])),
        ("TestBool", Value::Bool(true)),
        ("TestNull", Value::Null),
    ];
    for (name, value) in cases {
        let node = registry.require(name).unwrap().encoder(value.clone()).unwrap();
        assert_eq!(node.encode().unwrap(), value, "{name}");
    }
}

#[test]
fn test_all_kinds_reject_invalid_values() {
    let registry = all_kinds();
    let cases = [
        ("TestString", Value::Int(100)),
        ("TestInt", Value::from("string")),
        ("TestInt", Value::Float(1.5)),
        ("TestFloat", Value::Int(100)),
        ("TestBytes", Value::from("asdf")),
        ("TestMap", Value::list([])),
        ("TestList", Value::map::<String, _>([])),
        ("TestNull", Value::from("asdf")),
        ("TestBool", Value::from("asdf")),
        ("TestLink", Value::from("not a link")),
    ];
    for (name, value) in cases {
        assert!(
            registry.require(name).unwrap().encoder(value.clone()).is_err(),
            "{name} should reject {value}"
        );
    }
}

#[test]
fn test_integral_float_is_an_int() {
    let registry = all_kinds();
    registry.require("TestInt").unwrap().encoder(Value::Float(3.0)).unwrap();
    assert!(registry.require("TestFloat").unwrap().encoder(Value::Float(3.0)).is_err());
}

#[test]
fn test_all_kinds_in_struct() {
    let registry = registry(json!({
        "types": {
            "Test": {
                "kind": "struct",
                "fields": {
                    "string": { "type": "String" },
                    "int": { "type": "Int" },
                    "float": { "type": "Float" },
                    "bytes": { "type": "Bytes" },
                    "map": { "type": "Map" },
                    "list": { "type": "List" },
                    "null": { "type": "Null" }
                },
                "representation": { "map": {} }
            }
        }
    }));
    let value = Value::map([
        ("string", Value::from("test")),
        ("int", Value::Int(1)),
        ("float", Value::Float(1.1)),
        ("bytes", Value::Bytes(b"test".to_vec())),
        ("map", Value::map([("hello", Value::from("world"))])),
        ("list", Value::list([Value::Null])),
        ("null", Value::Null),
    ]);
    let node = registry.require("Test").unwrap().encoder(value.clone()).unwrap();
    assert_eq!(node.encode().unwrap(), value);
}

fn nested() -> Registry {
    registry(json!({
        "types": {
            "Foo": { "kind": "string" },
            "Bar": { "kind": "list", "valueType": "Foo" },
            "Baz": {
                "kind": "list",
                "valueType": { "kind": "map", "keyType": "String", "valueType": "Foo" }
            }
        }
    }))
}

#[test]
fn test_nested_value_types_accept() {
    let registry = nested();
    for (name, value) in [
        ("Bar", json!(["asdf"])),
        ("Bar", json!([])),
        ("Baz", json!([{ "adf": "asdf" }])),
        ("Baz", json!([])),
    ] {
        let node = registry.require(name).unwrap().encoder(value.clone()).unwrap();
        assert_eq!(node.encode().unwrap(), Value::from(value));
    }
}

#[test]
fn test_nested_value_types_reject() {
    let registry = nested();
    for (name, value) in [
        ("Bar", json!([100])),
        ("Bar", json!({ "should": "fail" })),
        ("Baz", json!([["asdf"]])),
        ("Baz", json!([null])),
        ("Baz", json!([{ "adf": 1 }])),
    ] {
        assert!(
            registry.require(name).unwrap().encoder(value.clone()).is_err(),
            "{name} should reject {value}"
        );
    }
}

#[test]
fn test_nested_children_carry_their_types() {
    let registry = nested();
    let baz = registry
        .require("Baz")
        .unwrap()
        .encoder(json!([{ "k": "v" }]))
        .unwrap();
    let inner = baz.resolve("0").unwrap().unwrap();
    assert_eq!(inner.type_name(), "Map");
    assert!(inner.is_builtin());
    assert_eq!(inner.resolve("k").unwrap().unwrap().type_name(), "Foo");
}

#[test]
fn test_yaml_schema_compiles() {
    let schema = Schema::from_yaml_str(
        r#"
types:
  Foo:
    kind: string
  Bar:
    kind: list
    valueType: Foo
"#,
    )
    .unwrap();
    let registry = compile(&schema, CompileOptions::new()).unwrap();
    registry.require("Bar").unwrap().encoder(json!(["a"])).unwrap();
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn int_nodes_encode_to_their_input(n in any::<i64>()) {
            let registry = all_kinds();
            let node = registry.require("TestInt").unwrap().encoder(Value::Int(n)).unwrap();
            prop_assert_eq!(node.encode().unwrap(), Value::Int(n));
        }

        #[test]
        fn strings_are_never_ints(s in ".*") {
            let registry = all_kinds();
            prop_assert!(registry.require("TestInt").unwrap().encoder(Value::from(s)).is_err());
        }

        #[test]
        fn lists_of_strings_validate_as_bar(items in proptest::collection::vec(".{0,8}", 0..8)) {
            let registry = nested();
            let value = Value::list(items.into_iter().map(Value::from));
            let node = registry.require("Bar").unwrap().encoder(value.clone()).unwrap();
            prop_assert_eq!(node.encode().unwrap(), value);
        }
    }
}
