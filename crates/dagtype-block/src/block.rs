//! # Blocks — Encoded Bytes Named by Their Content
//!
//! A [`Block`] pairs encoded bytes with the [`Cid`] computed from them.
//! Blocks are cheap to clone; the byte buffer is shared.

use std::sync::Arc;

use dagtype_core::{Cid, ContentDigest, Value};

use crate::codec::Multicodec;
use crate::error::BlockError;

/// An encoded block and its content identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    codec: Multicodec,
    bytes: Arc<[u8]>,
}

impl Block {
    /// Encode `value` with `codec` and compute its CID.
    pub fn encoder(value: &Value, codec: Multicodec) -> Result<Self, BlockError> {
        let bytes = codec.encode(value)?;
        let cid = Cid::new(codec.name(), ContentDigest::sha256(&bytes))?;
        Ok(Self {
            cid,
            codec,
            bytes: bytes.into(),
        })
    }

    /// Reassemble a block from a CID and bytes obtained elsewhere.
    ///
    /// The codec is taken from the CID. The bytes are not hashed here; call
    /// [`verify`](Block::verify) when the source is not trusted.
    pub fn from_parts(cid: Cid, bytes: impl Into<Arc<[u8]>>) -> Result<Self, BlockError> {
        let codec: Multicodec = cid.codec().parse()?;
        Ok(Self {
            cid,
            codec,
            bytes: bytes.into(),
        })
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn codec(&self) -> Multicodec {
        self.codec
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the block's bytes to a native value.
    pub fn decode(&self) -> Result<Value, BlockError> {
        self.codec.decode(&self.bytes)
    }

    /// Recompute the digest of the bytes and compare it with the CID.
    pub fn verify(&self) -> Result<(), BlockError> {
        let actual = ContentDigest::sha256(&self.bytes);
        if &actual != self.cid.digest() {
            return Err(BlockError::Integrity {
                cid: self.cid.clone(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }
}
