use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::{Blockstore, BlockstoreError};
use crate::linked_data::Cid;

/// In-memory blockstore using a HashMap
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockstore {
    inner: Arc<RwLock<HashMap<Cid, Bytes>>>,
}

impl MemoryBlockstore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> BlockstoreError {
    BlockstoreError::Internal(format!("failed to acquire lock: {}", e))
}

#[async_trait]
impl Blockstore for MemoryBlockstore {
    async fn put(&self, cid: &Cid, block: Bytes) -> Result<(), BlockstoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.entry(*cid).or_insert(block);
        Ok(())
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockstoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .get(cid)
            .cloned()
            .ok_or(BlockstoreError::NotFound(*cid))
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockstoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.contains_key(cid))
    }

    async fn delete(&self, cid: &Cid) -> Result<(), BlockstoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.remove(cid);
        Ok(())
    }

    async fn cids(&self) -> Result<Vec<Cid>, BlockstoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked_data::{cid_for, RAW};

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryBlockstore::new();
        let cid = cid_for(RAW, b"block");

        assert!(!store.has(&cid).await.unwrap());
        store.put(&cid, Bytes::from_static(b"block")).await.unwrap();
        assert!(store.has(&cid).await.unwrap());
        assert_eq!(store.get(&cid).await.unwrap().as_ref(), b"block");
        assert_eq!(store.cids().await.unwrap(), vec![cid]);

        store.delete(&cid).await.unwrap();
        assert!(matches!(
            store.get(&cid).await,
            Err(BlockstoreError::NotFound(_))
        ));
        // deleting twice is fine
        store.delete(&cid).await.unwrap();
    }
}
