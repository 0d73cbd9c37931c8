//! # dagtype-core — Foundational Types
//!
//! This crate is the leaf of the dagtype workspace. It defines the data
//! that every other crate passes around: the native [`Value`] tree that
//! codecs decode into and typed nodes encode back to, the [`Cid`] content
//! identifier that links blocks together, and the canonical byte
//! production used for digest computation.
//!
//! ## Key Design Principles
//!
//! 1. **One native value model.** Codecs, the schema engine and block
//!    stores all speak [`Value`]. Links are a first-class variant, not a
//!    specially shaped map, so no layer has to sniff for them.
//!
//! 2. **Ordered maps.** [`Value::Map`] preserves insertion order. Typed
//!    nodes re-encode fields in the order the caller supplied them.
//!
//! 3. **`CanonicalBytes` newtype.** Digests over structured data flow through
//!    `CanonicalBytes::new()` (RFC 8785 JCS). Raw byte blocks are hashed
//!    directly with [`ContentDigest::sha256`].
//!
//! 4. **Validated identifiers.** A [`Cid`] can only be built from a valid
//!    codec name and a tagged digest, or parsed from its textual form.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dagtype-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod cid;
pub mod error;
pub mod value;

pub use canonical::CanonicalBytes;
pub use cid::{sha256_digest, Cid, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CidError, CoreError};
pub use value::{Map, Value};
