use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{Datastore, DatastoreError, Key};

/// In-memory datastore using a BTreeMap
#[derive(Debug, Clone, Default)]
pub struct MemoryDatastore {
    inner: Arc<RwLock<BTreeMap<Key, Vec<u8>>>>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> DatastoreError {
    DatastoreError::Backend(format!("failed to acquire lock: {}", e))
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, DatastoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(key).cloned())
    }

    async fn put(&self, key: &Key, value: Vec<u8>) -> Result<(), DatastoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(key.clone(), value);
        Ok(())
    }

    async fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.remove(key);
        Ok(())
    }

    async fn query(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>, DatastoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .iter()
            .filter(|(key, _)| key.is_descendant_of(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
