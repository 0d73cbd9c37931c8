//! # Node Construction
//!
//! Builds node trees from native values. Construction is eager and
//! recursive: every nested value becomes a node of the type its parent
//! declares for it (a struct field, a map or list value type, a union
//! member), or of the builtin type for its kind when nothing is declared.
//! A `null` for a nullable field stays a null node whatever the field's type.
//!
//! Construction never checks kinds. A map type handed a string still builds
//! a node; [`Node::validate`] reports the mismatch. Keyed unions are the
//! exception: their shape decides which member type to build, so a
//! malformed union value fails here.

use std::sync::Arc;

use dagtype_core::Value;
use indexmap::IndexMap;

use crate::error::NodeError;
use crate::node::{Body, Node};
use crate::registry::Registry;
use crate::typedef::{Member, Shape, TypeDef, UnionRepresentation};

/// What a type's constructor accepts: a native value, or an existing node.
#[derive(Debug, Clone)]
pub enum NodeInput {
    Value(Value),
    Node(Node),
}

impl From<Value> for NodeInput {
    fn from(value: Value) -> Self {
        NodeInput::Value(value)
    }
}

impl From<Node> for NodeInput {
    fn from(node: Node) -> Self {
        NodeInput::Node(node)
    }
}

impl From<&Node> for NodeInput {
    fn from(node: &Node) -> Self {
        NodeInput::Node(node.clone())
    }
}

impl From<serde_json::Value> for NodeInput {
    fn from(json: serde_json::Value) -> Self {
        NodeInput::Value(json.into())
    }
}

pub(crate) fn create(
    registry: &Registry,
    def: &Arc<TypeDef>,
    input: NodeInput,
) -> Result<Node, NodeError> {
    match input {
        NodeInput::Value(value) => build(registry, def, value, false),
        NodeInput::Node(node) => {
            let same_type = Arc::ptr_eq(node.def(), def);
            let upcast = def.open && node.kind() == def.kind;
            if same_type || upcast {
                Ok(node)
            } else {
                Err(NodeError::CannotRetype {
                    from: node.type_name().to_string(),
                    to: def.name.clone(),
                })
            }
        }
    }
}

pub(crate) fn build(
    registry: &Registry,
    def: &Arc<TypeDef>,
    value: Value,
    nullable: bool,
) -> Result<Node, NodeError> {
    if nullable && value.is_null() {
        return Ok(Node::new(registry.clone(), Arc::clone(def), true, Body::Scalar(value)));
    }
    let body = match &def.shape {
        Shape::Scalar | Shape::Link { .. } => Body::Scalar(value),
        Shape::Map { values } => match value {
            Value::Map(entries) => Body::Map(children(registry, values.as_ref(), entries)?),
            other => Body::Scalar(other),
        },
        Shape::List { values } => match value {
            Value::List(items) => Body::List(
                items
                    .into_iter()
                    .map(|item| child(registry, values.as_ref(), item))
                    .collect::<Result<_, _>>()?,
            ),
            other => Body::Scalar(other),
        },
        Shape::Struct { fields, .. } => match value {
            Value::Map(entries) => {
                let mut nodes = IndexMap::with_capacity(entries.len());
                for (name, value) in entries {
                    let node = match fields.get(&name) {
                        Some(field) => build_member(registry, &field.member, value, field.nullable)?,
                        None => registry.infer(value)?,
                    };
                    nodes.insert(name, node);
                }
                Body::Struct(nodes)
            }
            other => Body::Scalar(other),
        },
        Shape::Union { representation } => keyed_union(registry, def, representation, value)?,
        Shape::Advanced { layout, .. } => Body::Advanced {
            backing: registry.require(layout)?.create(value)?,
        },
    };
    Ok(Node::new(registry.clone(), Arc::clone(def), nullable, body))
}

pub(crate) fn build_member(
    registry: &Registry,
    member: &Member,
    value: Value,
    nullable: bool,
) -> Result<Node, NodeError> {
    match member {
        Member::Named(name) => registry.require(name)?.build(value, nullable),
        Member::Inline(def) => build(registry, def, value, nullable),
    }
}

fn child(registry: &Registry, member: Option<&Member>, value: Value) -> Result<Node, NodeError> {
    match member {
        Some(member) => build_member(registry, member, value, false),
        None => registry.infer(value),
    }
}

fn children(
    registry: &Registry,
    member: Option<&Member>,
    entries: dagtype_core::Map,
) -> Result<IndexMap<String, Node>, NodeError> {
    entries
        .into_iter()
        .map(|(key, value)| Ok((key, child(registry, member, value)?)))
        .collect()
}

fn keyed_union(
    registry: &Registry,
    def: &TypeDef,
    representation: &UnionRepresentation,
    value: Value,
) -> Result<Body, NodeError> {
    let members = match representation {
        UnionRepresentation::Keyed(members) => members,
        UnionRepresentation::Unsupported(strategy) => {
            return Err(NodeError::NotImplemented(format!(
                "{strategy} representation of union {}",
                def.name
            )))
        }
    };
    let entries = match value {
        Value::Map(entries) => entries,
        other => {
            return Err(NodeError::UnionNotMap {
                type_name: def.name.clone(),
                found: other.shape_name(),
            })
        }
    };
    let found = entries.len();
    let mut entries = entries.into_iter();
    let (key, inner) = match (entries.next(), found) {
        (Some(entry), 1) => entry,
        _ => {
            return Err(NodeError::UnionKeyCount {
                type_name: def.name.clone(),
                found,
            })
        }
    };
    let member = members
        .get(&key)
        .ok_or_else(|| NodeError::UnknownUnionKey {
            type_name: def.name.clone(),
            key: key.clone(),
        })?;
    let variant = build_member(registry, member, inner, false)?;
    Ok(Body::Union { key, variant })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::Schema;
    use crate::kind::Kind;
    use crate::options::CompileOptions;
    use serde_json::json;

    fn registry() -> Registry {
        let schema = Schema::from_value(json!({
            "types": {
                "Name": { "kind": "string" },
                "Names": { "kind": "list", "valueType": "Name" },
                "Pet": {
                    "kind": "union",
                    "representation": { "keyed": { "dog": "Name", "cat": "Int" } }
                },
                "Tuple": { "kind": "union", "representation": { "tuple": {} } }
            }
        }))
        .unwrap();
        Registry::compile(&schema, CompileOptions::new()).unwrap()
    }

    #[test]
    fn test_list_children_take_declared_type() {
        let registry = registry();
        let names = registry
            .require("Names")
            .unwrap()
            .create(json!(["a", "b"]))
            .unwrap();
        let first = names.resolve("0").unwrap().unwrap();
        assert_eq!(first.type_name(), "Name");
    }

    #[test]
    fn test_untyped_children_are_inferred() {
        let registry = registry();
        let map = registry
            .require("Map")
            .unwrap()
            .create(json!({ "n": 1, "s": "x", "l": [null] }))
            .unwrap();
        assert_eq!(map.resolve("n").unwrap().unwrap().kind(), Kind::Int);
        assert_eq!(map.resolve("s").unwrap().unwrap().kind(), Kind::String);
        let list = map.resolve("l").unwrap().unwrap();
        assert_eq!(list.kind(), Kind::List);
        assert_eq!(list.resolve("0").unwrap().unwrap().kind(), Kind::Null);
    }

    #[test]
    fn test_shape_mismatch_builds_then_fails_validation() {
        let registry = registry();
        let node = registry.require("Names").unwrap().create(json!("nope")).unwrap();
        assert!(matches!(
            node.validate(),
            Err(NodeError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_union_requires_single_key() {
        let pet = registry().require("Pet").unwrap();
        assert!(matches!(
            pet.create(json!({})),
            Err(NodeError::UnionKeyCount { found: 0, .. })
        ));
        assert!(matches!(
            pet.create(json!({ "dog": "rex", "cat": 1 })),
            Err(NodeError::UnionKeyCount { found: 2, .. })
        ));
    }

    #[test]
    fn test_union_rejects_non_map_and_unknown_key() {
        let pet = registry().require("Pet").unwrap();
        assert!(matches!(
            pet.create(json!("rex")),
            Err(NodeError::UnionNotMap { found: "string", .. })
        ));
        assert!(matches!(
            pet.create(json!({ "fish": 1 })),
            Err(NodeError::UnknownUnionKey { .. })
        ));
    }

    #[test]
    fn test_unsupported_union_representation() {
        let err = registry()
            .require("Tuple")
            .unwrap()
            .create(json!({ "a": 1 }))
            .unwrap_err();
        assert!(matches!(err, NodeError::NotImplemented(_)));
    }

    #[test]
    fn test_existing_node_of_same_type_is_returned() {
        let registry = registry();
        let name = registry.require("Name").unwrap();
        let node = name.create(json!("x")).unwrap();
        let again = name.create(&node).unwrap();
        assert!(again.ptr_eq(&node));
    }

    #[test]
    fn test_builtin_accepts_node_of_same_kind() {
        let registry = registry();
        let named = registry.require("Name").unwrap().create(json!("x")).unwrap();
        let upcast = registry.require("String").unwrap().create(&named).unwrap();
        assert!(upcast.ptr_eq(&named));
    }

    #[test]
    fn test_cannot_retype() {
        let registry = registry();
        let plain = registry.require("String").unwrap().create(json!("x")).unwrap();
        let err = registry.require("Name").unwrap().create(&plain).unwrap_err();
        assert!(matches!(
            err,
            NodeError::CannotRetype { ref from, ref to } if from == "String" && to == "Name"
        ));
        let int = registry.require("Int").unwrap().create(json!(1)).unwrap();
        assert!(registry.require("String").unwrap().create(&int).is_err());
    }
}
