use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::{Blockstore, BlockstoreError};
use crate::linked_data::{parse_cid, Cid};

/// Blockstore keeping one file per block in a single
///  directory. Files are named by the block's CID string
///  and written through a temporary file + rename so a
///  reader never observes a partial block.
#[derive(Debug, Clone)]
pub struct FsBlockstore {
    root: PathBuf,
    tmp_counter: Arc<AtomicU64>,
}

impl FsBlockstore {
    /// Open (creating if needed) a blockstore rooted at `path`
    pub async fn open(path: &Path) -> Result<Self, BlockstoreError> {
        tokio::fs::create_dir_all(path).await?;
        tracing::debug!(path = %path.display(), "opened filesystem blockstore");
        Ok(Self {
            root: path.to_path_buf(),
            tmp_counter: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, cid: &Cid) -> PathBuf {
        self.root.join(cid.to_string())
    }
}

#[async_trait]
impl Blockstore for FsBlockstore {
    async fn put(&self, cid: &Cid, block: Bytes) -> Result<(), BlockstoreError> {
        let path = self.block_path(cid);
        if tokio::fs::try_exists(&path).await? {
            return Ok(());
        }
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = self.root.join(format!(".{}.{}.tmp", cid, n));
        tokio::fs::write(&tmp, &block).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockstoreError> {
        match tokio::fs::read(self.block_path(cid)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlockstoreError::NotFound(*cid)),
            Err(e) => Err(e.into()),
        }
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockstoreError> {
        Ok(tokio::fs::try_exists(self.block_path(cid)).await?)
    }

    async fn delete(&self, cid: &Cid) -> Result<(), BlockstoreError> {
        match tokio::fs::remove_file(self.block_path(cid)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn cids(&self) -> Result<Vec<Cid>, BlockstoreError> {
        let mut cids = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            match parse_cid(&name) {
                Ok(cid) => cids.push(cid),
                Err(e) => tracing::warn!("skipping unrecognised file in blockstore: {}", e),
            }
        }
        Ok(cids)
    }
}
