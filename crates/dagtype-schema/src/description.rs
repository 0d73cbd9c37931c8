//! # Schema Descriptions
//!
//! The serde model of a parsed schema: a map of named type definitions plus
//! a map of declared advanced layouts. Descriptions arrive as JSON or YAML;
//! both parse into the same [`Schema`].
//!
//! ```json
//! {
//!   "types": {
//!     "A": { "kind": "struct",
//!            "fields": { "b": { "type": { "kind": "link", "expectedType": "B" } } },
//!            "representation": { "map": {} } }
//!   },
//!   "advanced": { "Layout": { "kind": "advanced" } }
//! }
//! ```
//!
//! Type definitions keep their declaration order; compilation depends on it
//! for advanced layouts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// A parsed schema description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub types: IndexMap<String, TypeDefinition>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub advanced: IndexMap<String, AdvancedDeclaration>,
}

impl Schema {
    pub fn from_json_str(text: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CompileError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, CompileError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// One entry of the `advanced` section. Only its presence matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinition {
    pub kind: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representation: Option<RepresentationDefinition>,
}

impl TypeDefinition {
    /// A definition of `kind` with nothing else set.
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: IndexMap::new(),
            key_type: None,
            value_type: None,
            expected_type: None,
            representation: None,
        }
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
}

/// A reference to a type: by name, or an anonymous definition inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Named(String),
    Inline(InlineType),
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Named(name.to_string())
    }
}

/// Anonymous type definitions that may appear where a type is referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InlineType {
    Link {
        #[serde(
            rename = "expectedType",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        expected_type: Option<String>,
    },
    Map {
        #[serde(rename = "keyType", default, skip_serializing_if = "Option::is_none")]
        key_type: Option<String>,
        #[serde(
            rename = "valueType",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        value_type: Option<Box<TypeRef>>,
    },
    List {
        #[serde(
            rename = "valueType",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        value_type: Option<Box<TypeRef>>,
    },
}

/// The representation block of a type definition. Exactly one strategy is
/// expected to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepresentationDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyed: Option<IndexMap<String, TypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<String>,
    /// Strategies the engine recognises by name only (tuple, envelope, ...).
    #[serde(flatten)]
    pub other: IndexMap<String, serde_json::Value>,
}

/// A borrowed view of the strategy a [`RepresentationDefinition`] selects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Representation<'a> {
    Map,
    Keyed(&'a IndexMap<String, TypeRef>),
    Advanced(&'a str),
    Other(&'a str),
}

impl RepresentationDefinition {
    pub fn strategy(&self) -> Option<Representation<'_>> {
        if let Some(layout) = &self.advanced {
            return Some(Representation::Advanced(layout));
        }
        if let Some(members) = &self.keyed {
            return Some(Representation::Keyed(members));
        }
        if self.map.is_some() {
            return Some(Representation::Map);
        }
        self.other
            .keys()
            .next()
            .map(|name| Representation::Other(name.as_str()))
    }
}
