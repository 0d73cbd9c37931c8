//! # Native Values — The Decoded Data Model
//!
//! `Value` is what a codec decodes a block into and what a typed node
//! encodes back to. It covers the full data model of self-describing,
//! content-addressed data: the JSON kinds plus byte strings and links.
//!
//! Maps are insertion-ordered so that re-encoding a typed node reproduces
//! the field order the caller supplied.

use std::fmt;

use indexmap::IndexMap;

use crate::cid::Cid;

/// Insertion-ordered string-keyed map of values.
pub type Map = IndexMap<String, Value>;

/// A native, untyped value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Map),
    /// A reference to another encoded block.
    Link(Cid),
}

impl Value {
    /// Build a map value from key/value pairs, keeping their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list value.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Short lowercase name of the native shape, used in diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Link(_) => "link",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for whole numbers: any `Int`, or a finite `Float` with no
    /// fractional part.
    pub fn is_integral(&self) -> bool {
        match self {
            Value::Int(_) => true,
            Value::Float(f) => f.is_finite() && f.fract() == 0.0,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Cid> {
        match self {
            Value::Link(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Link(c) => write!(f, "<link {c}>"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k:?}:{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Cid> for Value {
    fn from(cid: Cid) -> Self {
        Value::Link(cid)
    }
}

/// Plain JSON converts structurally: integers that fit `i64` become `Int`,
/// every other number becomes `Float`. No link or bytes detection happens
/// here; that is the job of a codec.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::map(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cid::ContentDigest;
    use serde_json::json;

    #[test]
    fn test_json_conversion_keeps_order() {
        let v = Value::from(json!({"z": 1, "a": 2}));
        let keys: Vec<&String> = v.as_map().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_json_numbers() {
        assert_eq!(Value::from(json!(3)), Value::Int(3));
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn test_is_integral() {
        assert!(Value::Int(7).is_integral());
        assert!(Value::Float(2.0).is_integral());
        assert!(!Value::Float(2.5).is_integral());
        assert!(!Value::Float(f64::NAN).is_integral());
        assert!(!Value::String("1".into()).is_integral());
    }

    #[test]
    fn test_display_is_json_like() {
        let v = Value::map([("name", Value::from("x")), ("n", Value::list([Value::Null]))]);
        assert_eq!(v.to_string(), r#"{"name":"x","n":[null]}"#);
    }

    #[test]
    fn test_link_accessor() {
        let cid = Cid::new("raw", ContentDigest::sha256(b"x")).unwrap();
        let v = Value::from(cid.clone());
        assert_eq!(v.as_link(), Some(&cid));
        assert_eq!(v.shape_name(), "link");
    }
}
