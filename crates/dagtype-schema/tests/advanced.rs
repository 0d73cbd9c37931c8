//! # Advanced Layout Tests
//!
//! Layouts that forward to their backing node, layouts with their own
//! operations and lookups, and advanced types imported into another schema.

use std::sync::Arc;

use dagtype_core::Value;
use dagtype_schema::{
    compile, AdvancedLayout, CompileOptions, Kind, Node, NodeError, PassThrough, Registry, Schema,
};
use parking_lot::Mutex;
use serde_json::json;

/// Records the backing node's encoding whenever `test` is invoked.
#[derive(Default, Clone)]
struct Recorder {
    seen: Arc<Mutex<Option<Value>>>,
}

impl AdvancedLayout for Recorder {
    fn invoke(&self, node: &Node, operation: &str, _args: &[Value]) -> Result<Value, NodeError> {
        match operation {
            "test" => {
                let encoded = node.backing()?.encode()?;
                *self.seen.lock() = Some(encoded.clone());
                Ok(encoded)
            }
            other => Err(NodeError::UnknownOperation {
                type_name: node.type_name().to_string(),
                operation: other.to_string(),
            }),
        }
    }
}

/// Exposes a virtual `size` property next to the backing map's entries.
struct WithSize;

impl AdvancedLayout for WithSize {
    fn resolve(&self, node: &Node, segment: &str) -> Result<Option<Node>, NodeError> {
        let backing = node.backing()?;
        if segment == "size" {
            let size = backing.keys()?.count() as i64;
            return node.registry().infer(Value::Int(size)).map(Some);
        }
        backing.resolve(segment)
    }
}

fn data_schema() -> Schema {
    Schema::from_value(json!({
        "types": {
            "DataLayout": { "kind": "map" },
            "Data": { "kind": "bytes", "representation": { "advanced": "DataLayout" } }
        },
        "advanced": { "DataLayout": { "kind": "advanced" } }
    }))
    .unwrap()
}

fn data_registry(layout: impl AdvancedLayout + 'static) -> Registry {
    compile(
        &data_schema(),
        CompileOptions::new().with_advanced("DataLayout", layout),
    )
    .unwrap()
}

#[test]
fn test_basic_advanced_layout() {
    let recorder = Recorder::default();
    let registry = compile(
        &Schema::from_value(json!({
            "types": {
                "TestAdvanced": { "kind": "map" },
                "TestMap": {
                    "kind": "map",
                    "keyType": "String",
                    "valueType": { "kind": "link", "expectedType": "Any" },
                    "representation": { "advanced": "TestAdvanced" }
                }
            },
            "advanced": { "TestAdvanced": { "kind": "advanced" } }
        }))
        .unwrap(),
        CompileOptions::new().with_advanced("TestAdvanced", recorder.clone()),
    )
    .unwrap();
    let hw = Value::from(json!({ "name": "hello world", "i": 1 }));
    let node = registry.require("TestMap").unwrap().encoder(hw.clone()).unwrap();
    assert_eq!(node.kind(), Kind::Advanced);
    assert_eq!(node.backing().unwrap().type_name(), "TestAdvanced");

    assert_eq!(node.invoke("test", &[]).unwrap(), hw);
    assert_eq!(recorder.seen.lock().clone(), Some(hw.clone()));
    assert_eq!(node.encode().unwrap(), hw);
}

#[test]
fn test_advanced_bytes_backed_by_map() {
    let recorder = Recorder::default();
    let registry = data_registry(recorder.clone());
    let hw = Value::from(json!({ "name": "hello world", "i": 1 }));
    let node = registry.require("Data").unwrap().encoder(hw.clone()).unwrap();
    node.invoke("test", &[]).unwrap();
    assert_eq!(recorder.seen.lock().clone(), Some(hw));
    assert!(matches!(node.read(0, None), Err(NodeError::NotBytes { .. })));
}

#[test]
fn test_backing_validation_applies() {
    let registry = data_registry(PassThrough);
    let err = registry
        .require("Data")
        .unwrap()
        .encoder(Value::Bytes(b"asdf".to_vec()))
        .unwrap_err();
    assert!(matches!(err, NodeError::KindMismatch { ref type_name, .. } if type_name == "DataLayout"));
}

#[test]
fn test_unknown_operation() {
    let registry = data_registry(PassThrough);
    let node = registry.require("Data").unwrap().encoder(json!({})).unwrap();
    assert!(matches!(
        node.invoke("missing", &[]),
        Err(NodeError::UnknownOperation { .. })
    ));
}

#[tokio::test]
async fn test_layout_resolve_and_keys() {
    let registry = data_registry(WithSize);
    let node = registry
        .require("Data")
        .unwrap()
        .encoder(json!({ "a": 1, "b": 2 }))
        .unwrap();
    assert_eq!(node.get("size").await.unwrap(), Value::Int(2));
    assert_eq!(node.get("b").await.unwrap(), Value::Int(2));
    let keys: Vec<_> = node.keys().unwrap().collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
fn test_advanced_node_cannot_be_retyped() {
    let registry = compile(
        &Schema::from_value(json!({
            "types": {
                "TestInt": { "kind": "int" },
                "DataLayout": { "kind": "map" },
                "Data": { "kind": "bytes", "representation": { "advanced": "DataLayout" } }
            },
            "advanced": { "DataLayout": { "kind": "advanced" } }
        }))
        .unwrap(),
        CompileOptions::new().with_advanced("DataLayout", PassThrough),
    )
    .unwrap();
    let data = registry.require("Data").unwrap();
    let int = registry.require("TestInt").unwrap().encoder(json!(1)).unwrap();
    let err = data.create(&int).unwrap_err();
    assert_eq!(err.to_string(), "cannot re-type node of type TestInt as Data");

    let node = data.create(json!({ "x": "y" })).unwrap();
    assert!(data.create(&node).unwrap().ptr_eq(&node));
}

#[tokio::test]
async fn test_advanced_types_passed_into_another_schema() {
    let recorder = Recorder::default();
    let types = data_registry(recorder.clone());
    let registry = compile(
        &Schema::from_value(json!({
            "types": { "Test": { "kind": "map", "keyType": "String", "valueType": "Data" } }
        }))
        .unwrap(),
        CompileOptions::new().with_types(&types),
    )
    .unwrap();
    let inner = Value::from(json!({ "name": "hello world", "i": 1 }));
    let test = registry
        .require("Test")
        .unwrap()
        .encoder(Value::map([("test", inner.clone())]))
        .unwrap();
    let node = test.get_node("test").await.unwrap();
    assert_eq!(node.type_name(), "Data");
    node.invoke("test", &[]).unwrap();
    assert_eq!(recorder.seen.lock().clone(), Some(inner));
}

#[test]
fn test_nullable_advanced_field() {
    let registry = compile(
        &Schema::from_value(json!({
            "types": {
                "DataLayout": { "kind": "map" },
                "Data": { "kind": "map", "representation": { "advanced": "DataLayout" } },
                "Holder": {
                    "kind": "struct",
                    "fields": { "data": { "type": "Data", "nullable": true } },
                    "representation": { "map": {} }
                }
            },
            "advanced": { "DataLayout": { "kind": "advanced" } }
        }))
        .unwrap(),
        CompileOptions::new().with_advanced("DataLayout", PassThrough),
    )
    .unwrap();
    let holder = registry.require("Holder").unwrap();

    let node = holder.encoder(json!({ "data": null })).unwrap();
    let data = node.resolve("data").unwrap().unwrap();
    assert!(data.is_null());
    assert_eq!(data.type_name(), "Data");
    assert!(data.backing().is_err());
    assert_eq!(node.encode().unwrap(), Value::from(json!({ "data": null })));

    let node = holder.encoder(json!({ "data": { "k": 1 } })).unwrap();
    let data = node.resolve("data").unwrap().unwrap();
    assert_eq!(data.backing().unwrap().type_name(), "DataLayout");
}
