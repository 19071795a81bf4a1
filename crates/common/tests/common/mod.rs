//! Shared test utilities for bucket integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ::common::blockstore::FsBlockstore;
use ::common::bucket::{Bucket, BUCKET_ROOT_NAMESPACES};
use ::common::datastore::{Datastore, DatastoreError, Key, MemoryDatastore};
use ::common::gate::MutationGate;
use ::common::linked_data::Cid;
use ::common::store::Store;
use async_trait::async_trait;
use tempfile::TempDir;

/// A bucket over in-memory stores
pub fn setup_bucket() -> Bucket {
    Bucket::new(Store::memory(), MutationGate::new())
}

/// A bucket over a filesystem blockstore in a fresh temp dir
///  and the given datastore
pub async fn setup_fs_bucket(datastore: Arc<dyn Datastore>) -> (Bucket, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let bucket = open_fs_bucket(&temp_dir, datastore).await;
    (bucket, temp_dir)
}

/// Open a bucket over the blockstore kept in `temp_dir`
pub async fn open_fs_bucket(temp_dir: &TempDir, datastore: Arc<dyn Datastore>) -> Bucket {
    let blocks = FsBlockstore::open(&temp_dir.path().join("blocks"))
        .await
        .unwrap();
    let store = Store::builder()
        .blockstore(Arc::new(blocks))
        .datastore(datastore)
        .build();
    Bucket::new(store, MutationGate::new())
}

/// Datastore wrapper recording every root pointer it persists,
///  whether that root was pinned at the time, and able to fail
///  deletes on demand
#[derive(Debug, Default)]
pub struct RecordingDatastore {
    inner: MemoryDatastore,
    roots: Mutex<Vec<Cid>>,
    pinned_on_persist: Mutex<Vec<bool>>,
    fail_deletes: AtomicBool,
}

impl RecordingDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every root persisted so far, oldest first
    pub fn roots(&self) -> Vec<Cid> {
        self.roots.lock().unwrap().clone()
    }

    /// For every persisted root, whether its pin record already
    ///  existed when the root pointer was written
    pub fn pinned_on_persist(&self) -> Vec<bool> {
        self.pinned_on_persist.lock().unwrap().clone()
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Datastore for RecordingDatastore {
    async fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, DatastoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &Key, value: Vec<u8>) -> Result<(), DatastoreError> {
        if *key == Key::with_namespaces(&BUCKET_ROOT_NAMESPACES) {
            let root = Cid::try_from(value.as_slice()).unwrap();
            let pin_key = Key::with_namespaces(&["ipss", "pins"]).child(&root.to_string());
            let pinned = self.inner.has(&pin_key).await?;
            self.roots.lock().unwrap().push(root);
            self.pinned_on_persist.lock().unwrap().push(pinned);
        }
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DatastoreError::Backend("delete refused".to_string()));
        }
        self.inner.delete(key).await
    }

    async fn query(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>, DatastoreError> {
        self.inner.query(prefix).await
    }
}

/// A bucket over a [`RecordingDatastore`]
pub fn setup_recording_bucket() -> (Bucket, Arc<RecordingDatastore>) {
    let datastore = Arc::new(RecordingDatastore::new());
    let store = Store::builder().datastore(datastore.clone()).build();
    (Bucket::new(store, MutationGate::new()), datastore)
}
