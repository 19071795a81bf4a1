use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

use crate::linked_data::Cid;

mod fs;
mod memory;

pub use fs::FsBlockstore;
pub use memory::MemoryBlockstore;

#[derive(Debug, thiserror::Error)]
pub enum BlockstoreError {
    #[error("block not found: {0}")]
    NotFound(Cid),
    #[error("blockstore i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blockstore error: {0}")]
    Internal(String),
}

/// Immutable storage of encoded blocks keyed by their
///  content identifier. Implementations must be safe to
///  share across tasks without additional locking.
#[async_trait]
pub trait Blockstore: Send + Sync + Debug + 'static {
    /// Store a block. Writing a block that already
    ///  exists is a no-op.
    async fn put(&self, cid: &Cid, block: Bytes) -> Result<(), BlockstoreError>;

    /// Read a block, failing with [`BlockstoreError::NotFound`]
    ///  if it is not held locally
    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockstoreError>;

    async fn has(&self, cid: &Cid) -> Result<bool, BlockstoreError>;

    /// Delete a block. Deleting an absent block is a no-op.
    async fn delete(&self, cid: &Cid) -> Result<(), BlockstoreError>;

    /// Enumerate every block held by the store
    async fn cids(&self) -> Result<Vec<Cid>, BlockstoreError>;
}
