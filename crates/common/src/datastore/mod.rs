use std::fmt::{Debug, Display};

use async_trait::async_trait;

mod memory;

pub use memory::MemoryDatastore;

/// A hierarchical datastore key, e.g. `/ipss/bucket-root`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Build a key from its namespace components
    pub fn with_namespaces<S: AsRef<str>>(namespaces: &[S]) -> Self {
        let mut key = String::new();
        for namespace in namespaces {
            key.push('/');
            key.push_str(namespace.as_ref().trim_matches('/'));
        }
        if key.is_empty() {
            key.push('/');
        }
        Self(key)
    }

    /// Append a child component
    pub fn child(&self, name: &str) -> Self {
        let parent = self.0.trim_end_matches('/');
        Self(format!("{}/{}", parent, name.trim_matches('/')))
    }

    /// The last component of the key
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `self` lives strictly below `prefix`
    pub fn is_descendant_of(&self, prefix: &Key) -> bool {
        let prefix = prefix.0.trim_end_matches('/');
        self.0.len() > prefix.len()
            && self.0.starts_with(prefix)
            && self.0.as_bytes()[prefix.len()] == b'/'
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error("datastore backend error: {0}")]
    Backend(String),
}

/// Durable key/value storage for the small amount of
///  mutable state we keep: the bucket root pointer and
///  pin records.
#[async_trait]
pub trait Datastore: Send + Sync + Debug + 'static {
    async fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, DatastoreError>;

    /// Insert or overwrite the value under `key`. The write
    ///  must be durable once this returns.
    async fn put(&self, key: &Key, value: Vec<u8>) -> Result<(), DatastoreError>;

    /// Delete `key`. Deleting an absent key is a no-op.
    async fn delete(&self, key: &Key) -> Result<(), DatastoreError>;

    /// Every entry strictly below `prefix`, in key order
    async fn query(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>, DatastoreError>;

    async fn has(&self, key: &Key) -> Result<bool, DatastoreError> {
        Ok(self.get(key).await?.is_some())
    }
}
