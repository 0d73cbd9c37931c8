//! # dagtype-block — Blocks, Codecs and Block Sources
//!
//! Everything that touches encoded bytes lives here, so the schema engine
//! can stay a pure interpreter over [`Value`](dagtype_core::Value) trees:
//!
//! - **Codecs** ([`Multicodec`]): `dag-json` (canonical JSON with link and
//!   bytes escapes) and `raw` (opaque byte strings).
//! - **Blocks** ([`Block`]): encoded bytes plus the CID naming them.
//! - **Block sources** ([`BlockSource`]): the async capability the path
//!   resolver awaits when it meets a link. [`MemoryBlockStore`] is the
//!   in-process implementation; [`block_source_fn`] adapts a closure.
//!
//! ## Integrity Invariant
//!
//! A block's CID is always computed from its own bytes. Blocks arriving from
//! an untrusted source can be checked with [`Block::verify`].

pub mod block;
pub mod codec;
pub mod error;
pub mod store;

pub use block::Block;
pub use codec::Multicodec;
pub use error::BlockError;
pub use store::{block_source_fn, BlockSource, FnBlockSource, MemoryBlockStore};
