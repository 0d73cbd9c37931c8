//! # Codecs — Value ⇄ Bytes
//!
//! Two codecs are supported:
//!
//! - **`dag-json`**: RFC 8785 canonical JSON. Links are written as
//!   `{"/": "<cid>"}` and byte strings as `{"/": {"bytes": "<base64>"}}`
//!   (standard alphabet, no padding). Canonical output means equal values
//!   always produce equal bytes and therefore equal CIDs.
//! - **`raw`**: the bytes of a byte-string value, untouched.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use dagtype_core::{CanonicalBytes, CanonicalizationError, Cid, Map, Value};
use serde_json::Value as Json;

use crate::error::BlockError;

/// Reserved key marking a dag-json escape object.
const ESCAPE_KEY: &str = "/";

/// A supported block codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Multicodec {
    #[default]
    DagJson,
    Raw,
}

impl Multicodec {
    /// The codec identifier used in CIDs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DagJson => "dag-json",
            Self::Raw => "raw",
        }
    }

    /// Encode a value to bytes.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, BlockError> {
        match self {
            Self::DagJson => {
                let json = to_json(value)?;
                Ok(CanonicalBytes::new(&json)?.into_vec())
            }
            Self::Raw => match value {
                Value::Bytes(b) => Ok(b.clone()),
                other => Err(BlockError::Encode {
                    codec: self.name(),
                    reason: format!("raw blocks hold bytes, got {}", other.shape_name()),
                }),
            },
        }
    }

    /// Decode bytes to a value.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, BlockError> {
        match self {
            Self::DagJson => {
                let json: Json = serde_json::from_slice(bytes).map_err(|e| BlockError::Decode {
                    codec: self.name(),
                    reason: e.to_string(),
                })?;
                from_json(json)
            }
            Self::Raw => Ok(Value::Bytes(bytes.to_vec())),
        }
    }
}

impl fmt::Display for Multicodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Multicodec {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dag-json" => Ok(Self::DagJson),
            "raw" => Ok(Self::Raw),
            other => Err(BlockError::UnknownCodec(other.to_string())),
        }
    }
}

/// Map a native value onto the dag-json JSON form.
fn to_json(value: &Value) -> Result<Json, BlockError> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or(CanonicalizationError::NonFiniteFloat(*f))?,
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => {
            let mut inner = serde_json::Map::new();
            inner.insert("bytes".to_string(), Json::String(STANDARD_NO_PAD.encode(b)));
            escape(Json::Object(inner))
        }
        Value::Link(cid) => escape(Json::String(cid.to_string())),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect::<Result<_, _>>()?),
        Value::Map(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), to_json(v)?);
            }
            Json::Object(out)
        }
    })
}

fn escape(inner: Json) -> Json {
    let mut obj = serde_json::Map::new();
    obj.insert(ESCAPE_KEY.to_string(), inner);
    Json::Object(obj)
}

/// Map dag-json JSON back onto native values, expanding link and bytes
/// escapes.
fn from_json(json: Json) -> Result<Value, BlockError> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::Int(i),
            (None, Some(f)) if n.is_f64() => Value::Float(f),
            _ => {
                return Err(BlockError::Decode {
                    codec: "dag-json",
                    reason: format!("integer {n} does not fit in i64"),
                })
            }
        },
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::List(items.into_iter().map(from_json).collect::<Result<_, _>>()?),
        Json::Object(obj) => {
            if obj.len() == 1 {
                if let Some(escaped) = obj.get(ESCAPE_KEY) {
                    if let Some(value) = unescape(escaped)? {
                        return Ok(value);
                    }
                }
            }
            let mut map = Map::with_capacity(obj.len());
            for (k, v) in obj {
                map.insert(k, from_json(v)?);
            }
            Value::Map(map)
        }
    })
}

fn unescape(escaped: &Json) -> Result<Option<Value>, BlockError> {
    match escaped {
        Json::String(s) => {
            let cid: Cid = s.parse()?;
            Ok(Some(Value::Link(cid)))
        }
        Json::Object(inner) if inner.len() == 1 => match inner.get("bytes") {
            Some(Json::String(b64)) => {
                let bytes = STANDARD_NO_PAD
                    .decode(b64.trim_end_matches('='))
                    .map_err(|e| BlockError::Decode {
                        codec: "dag-json",
                        reason: format!("invalid base64 in bytes escape: {e}"),
                    })?;
                Ok(Some(Value::Bytes(bytes)))
            }
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagtype_core::ContentDigest;

    fn cid() -> Cid {
        Cid::new("raw", ContentDigest::sha256(b"asdf")).unwrap()
    }

    #[test]
    fn test_dag_json_is_canonical() {
        let v = Value::map([("b", Value::Int(1)), ("a", Value::from("x"))]);
        let bytes = Multicodec::DagJson.encode(&v).unwrap();
        assert_eq!(bytes, br#"{"a":"x","b":1}"#);
    }

    #[test]
    fn test_dag_json_link_escape() {
        let v = Value::map([("l", Value::Link(cid()))]);
        let bytes = Multicodec::DagJson.encode(&v).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(text, format!(r#"{{"l":{{"/":"{}"}}}}"#, cid()));
        assert_eq!(Multicodec::DagJson.decode(&bytes).unwrap(), v);
    }

    #[test]
    fn test_dag_json_bytes_escape() {
        let v = Value::Bytes(b"asdf".to_vec());
        let bytes = Multicodec::DagJson.encode(&v).unwrap();
        assert_eq!(bytes, br#"{"/":{"bytes":"YXNkZg"}}"#);
        assert_eq!(Multicodec::DagJson.decode(&bytes).unwrap(), v);
    }

    #[test]
    fn test_dag_json_plain_slash_key_is_a_map() {
        let decoded = Multicodec::DagJson.decode(br#"{"/":1}"#).unwrap();
        assert_eq!(decoded, Value::map([("/", Value::Int(1))]));
    }

    #[test]
    fn test_dag_json_bad_link_is_error() {
        let err = Multicodec::DagJson.decode(br#"{"/":"not-a-cid"}"#).unwrap_err();
        assert!(matches!(err, BlockError::Cid(_)));
    }

    #[test]
    fn test_dag_json_integer_range() {
        assert_eq!(
            Multicodec::DagJson.decode(b"9223372036854775807").unwrap(),
            Value::Int(i64::MAX)
        );
        assert_eq!(Multicodec::DagJson.decode(b"1.5").unwrap(), Value::Float(1.5));
        let err = Multicodec::DagJson
            .decode(br#"{"n":9223372036854775808}"#)
            .unwrap_err();
        assert!(matches!(err, BlockError::Decode { codec: "dag-json", .. }));
    }

    #[test]
    fn test_dag_json_rejects_nan() {
        let err = Multicodec::DagJson.encode(&Value::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, BlockError::Canonicalization(_)));
    }

    #[test]
    fn test_raw_requires_bytes() {
        assert_eq!(
            Multicodec::Raw.encode(&Value::Bytes(vec![1, 2])).unwrap(),
            vec![1, 2]
        );
        assert!(Multicodec::Raw.encode(&Value::from("x")).is_err());
    }

    #[test]
    fn test_codec_names_parse() {
        assert_eq!("dag-json".parse::<Multicodec>().unwrap(), Multicodec::DagJson);
        assert_eq!("raw".parse::<Multicodec>().unwrap(), Multicodec::Raw);
        assert!(matches!(
            "dag-cbor".parse::<Multicodec>(),
            Err(BlockError::UnknownCodec(_))
        ));
    }
}
