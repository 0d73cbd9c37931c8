//! # Block Error Types
//!
//! Structured errors for codec, block and block-source operations.

use dagtype_core::{CanonicalizationError, Cid, CidError};
use thiserror::Error;

/// Errors from block encoding, decoding and retrieval.
#[derive(Error, Debug)]
pub enum BlockError {
    /// No codec is registered under this name.
    #[error("unknown codec {0:?}")]
    UnknownCodec(String),

    /// A value could not be encoded by the codec.
    #[error("{codec} encode error: {reason}")]
    Encode {
        /// Codec name.
        codec: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// Bytes could not be decoded by the codec.
    #[error("{codec} decode error: {reason}")]
    Decode {
        /// Codec name.
        codec: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// The block's bytes do not hash to its CID.
    #[error("integrity error: block {cid} hashes to {actual}")]
    Integrity {
        /// The CID the block claims.
        cid: Cid,
        /// The digest recomputed from the bytes.
        actual: String,
    },

    /// The block source failed to answer.
    #[error("block source unavailable: {0}")]
    Unavailable(String),

    /// CID construction failed.
    #[error(transparent)]
    Cid(#[from] CidError),

    /// Canonicalization of a dag-json payload failed.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
}
