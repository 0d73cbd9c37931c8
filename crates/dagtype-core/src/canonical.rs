//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the construction path for bytes of structured data
//! that are going to be hashed. Output follows RFC 8785 (JSON
//! Canonicalization Scheme): sorted keys, compact separators, deterministic
//! number formatting.
//!
//! ## Invariant
//!
//! The inner `Vec<u8>` is private. The only constructor runs the coercion
//! pass and the JCS serializer, so a `CanonicalBytes` value is always
//! canonical.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::NonFiniteFloat` for NaN or infinite
    /// numbers and `CanonicalizationError::SerializationFailed` if
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        check_finite(&value)?;
        let bytes = serde_jcs::to_string(&value)?.into_bytes();
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the owned byte vector.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the JSON tree and reject floats JCS cannot represent.
fn check_finite(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Err(CanonicalizationError::NonFiniteFloat(f)),
            _ => Ok(()),
        },
        Value::Array(items) => items.iter().try_for_each(check_finite),
        Value::Object(map) => map.values().try_for_each(check_finite),
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
    }
}
