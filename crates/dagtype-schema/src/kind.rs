//! # Kinds
//!
//! The closed set of shapes a type can take. Every compiled type has exactly
//! one kind; the kind decides which predicate validates a node and how the
//! node is built from a native value.

use std::fmt;

use dagtype_core::Value;

/// The shape of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Float,
    String,
    Bool,
    Null,
    Bytes,
    Map,
    List,
    Link,
    Struct,
    Union,
    /// A caller-implemented layout in front of a backing node.
    Advanced,
}

/// Kinds that have a builtin, schema-independent type registered under
/// [`Kind::builtin_name`].
pub(crate) const BUILTIN_KINDS: [Kind; 9] = [
    Kind::Int,
    Kind::Float,
    Kind::String,
    Kind::Bool,
    Kind::Null,
    Kind::Bytes,
    Kind::Map,
    Kind::List,
    Kind::Link,
];

/// Names no schema may define.
pub(crate) const RESERVED_NAMES: [&str; 12] = [
    "Int", "Float", "String", "Bool", "Null", "Bytes", "Map", "List", "Link", "Struct", "Union",
    "Advanced",
];

impl Kind {
    /// Parse a kind as written in a schema description. `advanced` is not a
    /// declarable kind; advanced types are selected by representation.
    pub fn from_declared(kind: &str) -> Option<Self> {
        Some(match kind {
            "int" => Kind::Int,
            "float" => Kind::Float,
            "string" => Kind::String,
            "bool" => Kind::Bool,
            "null" => Kind::Null,
            "bytes" => Kind::Bytes,
            "map" => Kind::Map,
            "list" => Kind::List,
            "link" => Kind::Link,
            "struct" => Kind::Struct,
            "union" => Kind::Union,
            _ => return None,
        })
    }

    /// Lowercase schema spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Null => "null",
            Kind::Bytes => "bytes",
            Kind::Map => "map",
            Kind::List => "list",
            Kind::Link => "link",
            Kind::Struct => "struct",
            Kind::Union => "union",
            Kind::Advanced => "advanced",
        }
    }

    /// Name of the builtin type for this kind.
    pub fn builtin_name(&self) -> &'static str {
        match self {
            Kind::Int => "Int",
            Kind::Float => "Float",
            Kind::String => "String",
            Kind::Bool => "Bool",
            Kind::Null => "Null",
            Kind::Bytes => "Bytes",
            Kind::Map => "Map",
            Kind::List => "List",
            Kind::Link => "Link",
            Kind::Struct => "Struct",
            Kind::Union => "Union",
            Kind::Advanced => "Advanced",
        }
    }

    /// Leaf kinds hold a single native value and have no sub-structure.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Float | Kind::String | Kind::Bool | Kind::Null | Kind::Bytes
        )
    }

    /// Pick the kind for an untyped value from its native shape.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Null,
            Value::Bytes(_) => Kind::Bytes,
            Value::String(_) => Kind::String,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) if value.is_integral() => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Link(_) => Kind::Link,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
        }
    }

    /// The scalar predicate. Containers, structs, unions and advanced
    /// layouts are checked structurally by the node instead.
    pub(crate) fn accepts_scalar(&self, value: &Value) -> bool {
        match self {
            Kind::Int => value.is_integral(),
            Kind::Float => matches!(value, Value::Float(_)) && !value.is_integral(),
            Kind::String => matches!(value, Value::String(_)),
            Kind::Bool => matches!(value, Value::Bool(_)),
            Kind::Null => value.is_null(),
            Kind::Bytes => matches!(value, Value::Bytes(_)),
            Kind::Link => matches!(value, Value::Link(_)),
            Kind::Map | Kind::List | Kind::Struct | Kind::Union | Kind::Advanced => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
