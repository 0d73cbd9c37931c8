//! # Error Types — Structured Error Hierarchy
//!
//! Errors raised by the foundational types. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations. Downstream crates wrap
//! [`CoreError`] (or its parts) through `#[from]` conversions.

use thiserror::Error;

/// Top-level error type for `dagtype-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A content identifier could not be parsed or constructed.
    #[error("cid error: {0}")]
    Cid(#[from] CidError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN and the infinities have no JSON representation.
    #[error("non-finite float {0} cannot be canonicalized")]
    NonFiniteFloat(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error parsing or constructing a [`Cid`](crate::Cid).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidError {
    /// The textual form did not have the `<codec>:<algorithm>:<hex>` shape.
    #[error("malformed cid {0:?}: expected <codec>:<algorithm>:<hex>")]
    Malformed(String),

    /// The codec name violates the naming convention.
    #[error("invalid codec name {codec:?}: {reason}")]
    InvalidCodec {
        /// The rejected codec name.
        codec: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// The digest algorithm tag is not known.
    #[error("unknown digest algorithm {0:?}")]
    UnknownAlgorithm(String),

    /// The digest is not 64 lowercase hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
