use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::datastore::{Datastore, DatastoreError, Key};
use crate::linked_data::{parse_cid, Cid};

/// Tag carried by the pin on every bucket root
pub const BUCKET_ROOT_TAG: &str = "bucket-root";
/// Tag carried by the pin on every bucket item
pub const BUCKET_ITEM_TAG: &str = "bucket-item";

#[derive(Debug, thiserror::Error)]
pub enum PinError {
    #[error("datastore error: {0}")]
    Datastore(#[from] DatastoreError),
    #[error("invalid pin record at {0}: {1}")]
    InvalidRecord(Key, String),
}

/// A protection record: the pinned content and the
///  tag describing who pinned it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub cid: Cid,
    pub tag: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PinRecord {
    tag: String,
}

/// Set of content identifiers that must survive reclamation.
///  Pins protect the whole DAG below the pinned identifier.
///  Records live in the datastore under `/ipss/pins/<cid>`.
#[derive(Debug, Clone)]
pub struct Pins {
    datastore: Arc<dyn Datastore>,
    prefix: Key,
}

impl Pins {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self {
            datastore,
            prefix: Key::with_namespaces(&["ipss", "pins"]),
        }
    }

    fn key(&self, cid: &Cid) -> Key {
        self.prefix.child(&cid.to_string())
    }

    /// Pin `cid`. Pinning something already pinned keeps
    ///  the existing record.
    pub async fn add(&self, cid: &Cid, tag: &str) -> Result<(), PinError> {
        let key = self.key(cid);
        if self.datastore.has(&key).await? {
            tracing::debug!(%cid, "already pinned");
            return Ok(());
        }
        let record = serde_ipld_dagcbor::to_vec(&PinRecord {
            tag: tag.to_string(),
        })
        .map_err(|e| PinError::InvalidRecord(key.clone(), e.to_string()))?;
        self.datastore.put(&key, record).await?;
        tracing::debug!(%cid, tag, "pinned");
        Ok(())
    }

    /// Unpin `cid`, returning what was unpinned
    ///  (empty if it was not pinned)
    pub async fn rm(&self, cid: &Cid) -> Result<Vec<Cid>, PinError> {
        let key = self.key(cid);
        if !self.datastore.has(&key).await? {
            return Ok(Vec::new());
        }
        self.datastore.delete(&key).await?;
        tracing::debug!(%cid, "unpinned");
        Ok(vec![*cid])
    }

    pub async fn is_pinned(&self, cid: &Cid) -> Result<bool, PinError> {
        Ok(self.datastore.has(&self.key(cid)).await?)
    }

    pub async fn get(&self, cid: &Cid) -> Result<Option<Pin>, PinError> {
        let key = self.key(cid);
        match self.datastore.get(&key).await? {
            Some(value) => Ok(Some(Pin {
                cid: *cid,
                tag: decode_record(&key, &value)?.tag,
            })),
            None => Ok(None),
        }
    }

    /// Every pin, in key order
    pub async fn ls(&self) -> Result<Vec<Pin>, PinError> {
        let entries = self.datastore.query(&self.prefix).await?;
        entries
            .into_iter()
            .map(|(key, value)| {
                let cid = parse_cid(key.name())
                    .map_err(|e| PinError::InvalidRecord(key.clone(), e.to_string()))?;
                let record = decode_record(&key, &value)?;
                Ok(Pin {
                    cid,
                    tag: record.tag,
                })
            })
            .collect()
    }
}

fn decode_record(key: &Key, value: &[u8]) -> Result<PinRecord, PinError> {
    serde_ipld_dagcbor::from_slice(value)
        .map_err(|e| PinError::InvalidRecord(key.clone(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::MemoryDatastore;
    use crate::linked_data::{cid_for, RAW};

    #[tokio::test]
    async fn test_pin_lifecycle() {
        let pins = Pins::new(Arc::new(MemoryDatastore::new()));
        let cid = cid_for(RAW, b"pinned");

        assert!(!pins.is_pinned(&cid).await.unwrap());
        pins.add(&cid, BUCKET_ITEM_TAG).await.unwrap();
        assert!(pins.is_pinned(&cid).await.unwrap());
        assert_eq!(
            pins.get(&cid).await.unwrap(),
            Some(Pin {
                cid,
                tag: BUCKET_ITEM_TAG.to_string()
            })
        );

        assert_eq!(pins.rm(&cid).await.unwrap(), vec![cid]);
        assert!(!pins.is_pinned(&cid).await.unwrap());
        assert!(pins.rm(&cid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let pins = Pins::new(Arc::new(MemoryDatastore::new()));
        let cid = cid_for(RAW, b"twice");

        pins.add(&cid, BUCKET_ROOT_TAG).await.unwrap();
        pins.add(&cid, BUCKET_ITEM_TAG).await.unwrap();

        let all = pins.ls().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].tag, BUCKET_ROOT_TAG);
    }

    #[tokio::test]
    async fn test_ls() {
        let pins = Pins::new(Arc::new(MemoryDatastore::new()));
        let a = cid_for(RAW, b"a");
        let b = cid_for(RAW, b"b");
        pins.add(&a, BUCKET_ITEM_TAG).await.unwrap();
        pins.add(&b, BUCKET_ROOT_TAG).await.unwrap();

        let mut listed: Vec<Cid> = pins.ls().await.unwrap().into_iter().map(|p| p.cid).collect();
        listed.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(listed, expected);
    }
}
