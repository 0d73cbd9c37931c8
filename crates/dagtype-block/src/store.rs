//! # Block Sources — Fetching Blocks by CID
//!
//! [`BlockSource`] is the only I/O capability the schema engine consumes.
//! It is awaited once per link hop during path traversal. Implementations
//! own timeout, retry and cancellation policy; the engine adds none.
//!
//! [`MemoryBlockStore`] keeps blocks in a shared in-process table and is
//! what tests and embedded callers use. [`block_source_fn`] adapts an async
//! closure for callers that already have their own storage.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use dagtype_core::{Cid, Value};
use parking_lot::RwLock;

use crate::block::Block;
use crate::codec::Multicodec;
use crate::error::BlockError;

/// Async access to encoded blocks.
///
/// `Ok(None)` means the source answered and does not have the block;
/// `Err` means the source could not answer.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Fetch the block named by `cid`.
    async fn get_block(&self, cid: &Cid) -> Result<Option<Block>, BlockError>;
}

#[async_trait]
impl<T: BlockSource + ?Sized> BlockSource for Arc<T> {
    async fn get_block(&self, cid: &Cid) -> Result<Option<Block>, BlockError> {
        (**self).get_block(cid).await
    }
}

// ---------------------------------------------------------------------------
// MemoryBlockStore
// ---------------------------------------------------------------------------

/// An in-memory block table. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    blocks: Arc<RwLock<HashMap<Cid, Block>>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block, returning its CID. Storing the same block twice is a
    /// no-op.
    pub fn put(&self, block: Block) -> Cid {
        let cid = block.cid().clone();
        tracing::debug!(cid = %cid, size = block.bytes().len(), "storing block");
        self.blocks.write().entry(cid.clone()).or_insert(block);
        cid
    }

    /// Encode a value with `codec`, store it and return its CID.
    pub fn put_value(&self, value: &Value, codec: Multicodec) -> Result<Cid, BlockError> {
        Ok(self.put(Block::encoder(value, codec)?))
    }

    pub fn get(&self, cid: &Cid) -> Option<Block> {
        self.blocks.read().get(cid).cloned()
    }

    pub fn contains(&self, cid: &Cid) -> bool {
        self.blocks.read().contains_key(cid)
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl BlockSource for MemoryBlockStore {
    async fn get_block(&self, cid: &Cid) -> Result<Option<Block>, BlockError> {
        Ok(self.get(cid))
    }
}

// ---------------------------------------------------------------------------
// Closure adapter
// ---------------------------------------------------------------------------

/// A [`BlockSource`] backed by an async closure. Built by [`block_source_fn`].
pub struct FnBlockSource<F> {
    fetch: F,
}

impl<F> std::fmt::Debug for FnBlockSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBlockSource").finish_non_exhaustive()
    }
}

/// Adapt `fetch(cid) -> Future<Output = Result<Option<Block>, BlockError>>`
/// into a [`BlockSource`].
pub fn block_source_fn<F, Fut>(fetch: F) -> FnBlockSource<F>
where
    F: Fn(Cid) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Block>, BlockError>> + Send + 'static,
{
    FnBlockSource { fetch }
}

#[async_trait]
impl<F, Fut> BlockSource for FnBlockSource<F>
where
    F: Fn(Cid) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Block>, BlockError>> + Send + 'static,
{
    async fn get_block(&self, cid: &Cid) -> Result<Option<Block>, BlockError> {
        (self.fetch)(cid.clone()).await
    }
}
