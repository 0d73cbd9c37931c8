//! # Content Identifiers — Content-Addressed Block Names
//!
//! Defines `ContentDigest`, `DigestAlgorithm` and `Cid`. A CID names an
//! encoded block by the codec that produced its bytes and the digest of
//! those bytes, so a reader can both locate and decode the block from the
//! identifier alone.
//!
//! ## Textual Form
//!
//! `<codec>:<algorithm>:<hex>`, e.g.
//! `dag-json:sha256:44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a`.
//!
//! Codec names must match `^[a-z0-9][a-z0-9-]{0,63}$`. Digests are 64
//! lowercase hex characters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CidError;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            other => Err(CidError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest {
    algorithm: DigestAlgorithm,
    bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a content digest from raw digest bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Hash arbitrary block bytes with SHA-256.
    pub fn sha256(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self::new(DigestAlgorithm::Sha256, bytes)
    }

    /// The algorithm that produced this digest.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-character hex digest.
    pub fn from_hex(algorithm: DigestAlgorithm, hex: &str) -> Result<Self, CidError> {
        if hex.len() != 64 {
            return Err(CidError::InvalidDigest(format!(
                "digest must be 64 hex chars, got {} chars",
                hex.len()
            )));
        }
        if !hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
            return Err(CidError::InvalidDigest(
                "digest contains characters outside [0-9a-f]".into(),
            ));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|e| CidError::InvalidDigest(e.to_string()))?;
            bytes[i] =
                u8::from_str_radix(pair, 16).map_err(|e| CidError::InvalidDigest(e.to_string()))?;
        }
        Ok(Self::new(algorithm, bytes))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Structured data is always canonicalized before hashing so that two
/// encoders agreeing on the logical value agree on the digest.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest::sha256(data.as_bytes())
}

/// Validate a codec name against `^[a-z0-9][a-z0-9-]{0,63}$`.
fn validate_codec(codec: &str) -> Result<(), CidError> {
    let invalid = |reason: String| CidError::InvalidCodec {
        codec: codec.to_string(),
        reason,
    };
    if codec.is_empty() {
        return Err(invalid("codec name is required".into()));
    }
    if codec.len() > 64 {
        return Err(invalid(format!("too long: {} chars (max 64)", codec.len())));
    }
    let mut chars = codec.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return Err(invalid("must start with [a-z0-9]".into())),
    }
    if let Some(c) = chars.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')) {
        return Err(invalid(format!("contains invalid character {c:?}")));
    }
    Ok(())
}

/// A content identifier: the codec that encoded a block plus the digest of
/// the encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid {
    codec: String,
    digest: ContentDigest,
}

impl Cid {
    /// Build a CID for bytes produced by `codec`.
    pub fn new(codec: &str, digest: ContentDigest) -> Result<Self, CidError> {
        validate_codec(codec)?;
        Ok(Self {
            codec: codec.to_string(),
            digest,
        })
    }

    /// The name of the codec that produced the referenced block.
    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// The digest of the referenced block's bytes.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.codec, self.digest)
    }
}

impl FromStr for Cid {
    type Err = CidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(codec), Some(algorithm), Some(hex)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CidError::Malformed(s.to_string()));
        };
        let algorithm: DigestAlgorithm = algorithm.parse()?;
        let digest = ContentDigest::from_hex(algorithm, hex)?;
        Cid::new(codec, digest)
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
