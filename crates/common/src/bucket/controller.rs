use bytes::Bytes;

use crate::datastore::Key;
use crate::gate::MutationGate;
use crate::linked_data::Cid;
use crate::pins::{BUCKET_ITEM_TAG, BUCKET_ROOT_TAG};
use crate::store::Store;
use crate::unixfs::UnixfsError;

use super::error::{AddError, BucketError, RemoveError};

/// Namespaces of the key holding the persisted root
pub const BUCKET_ROOT_NAMESPACES: [&str; 2] = ["ipss", "bucket-root"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added {
    pub item: Cid,
    pub root: Cid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub root: Cid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub root: Cid,
    pub items: Vec<Cid>,
}

/// A single mutable collection of items over the immutable
///  store. The bucket is one directory whose entries are the
///  items, named by their own identifier; every mutation
///  writes a new directory and swaps the persisted root.
///
/// All public operations run inside the [`MutationGate`], so
///  clones of a bucket (and anything else holding the same
///  gate) observe a total order of root transitions.
#[derive(Debug, Clone)]
pub struct Bucket {
    store: Store,
    gate: MutationGate,
    root_key: Key,
}

impl Bucket {
    pub fn new(store: Store, gate: MutationGate) -> Self {
        Self {
            store,
            gate,
            root_key: Key::with_namespaces(&BUCKET_ROOT_NAMESPACES),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn gate(&self) -> &MutationGate {
        &self.gate
    }

    /// The current root, initialising the bucket if needed
    pub async fn root(&self) -> Result<Cid, BucketError> {
        let _guard = self.gate.acquire().await;
        self.get_or_create_root().await
    }

    /// Add `data` as a new item
    pub async fn add(&self, data: Bytes) -> Result<Added, AddError> {
        let _guard = self.gate.acquire().await;

        let item = self.store.unixfs().add_bytes(data).await.map_err(BucketError::from)?;
        let root = self.get_or_create_root().await?;
        if self.contains(&root, &item).await? {
            tracing::debug!(%item, "content already in bucket");
            return Err(AddError::ContentAlreadyExists(item));
        }

        self.store
            .pins()
            .add(&item, BUCKET_ITEM_TAG)
            .await
            .map_err(BucketError::from)?;
        let new_root = self
            .store
            .unixfs()
            .cp(&item, &root, &item.to_string())
            .await
            .map_err(BucketError::from)?;
        self.swap_root(&root, &new_root).await?;

        tracing::info!(%item, root = %new_root, "added item");
        Ok(Added {
            item,
            root: new_root,
        })
    }

    /// Remove the item `item`. Its content stays in the store
    ///  until reclaimed.
    pub async fn remove(&self, item: &Cid) -> Result<Removed, RemoveError> {
        let _guard = self.gate.acquire().await;

        let root = self.get_or_create_root().await?;
        if !self.contains(&root, item).await? {
            tracing::debug!(%item, "item not in bucket");
            return Err(RemoveError::ItemNotFound(*item));
        }

        let new_root = self
            .store
            .unixfs()
            .rm(&root, &item.to_string())
            .await
            .map_err(BucketError::from)?;
        self.swap_root(&root, &new_root).await?;
        self.store.pins().rm(item).await.map_err(BucketError::from)?;

        tracing::info!(%item, root = %new_root, "removed item");
        Ok(Removed { root: new_root })
    }

    /// The current root and the items below it
    pub async fn list(&self) -> Result<Listing, BucketError> {
        let _guard = self.gate.acquire().await;

        let root = self.get_or_create_root().await?;
        let items = self
            .store
            .unixfs()
            .ls(&root)
            .await?
            .into_iter()
            .map(|entry| entry.cid)
            .collect();
        Ok(Listing { root, items })
    }

    /// Replace the root with `new_root`. Nothing checks that
    ///  `new_root` is a directory; pointing the bucket at
    ///  anything else breaks listing and mutation until the
    ///  next override.
    pub async fn set_root(&self, new_root: &Cid) -> Result<(), BucketError> {
        let _guard = self.gate.acquire().await;

        let root = self.get_or_create_root().await?;
        self.swap_root(&root, new_root).await?;
        tracing::warn!(old = %root, new = %new_root, "bucket root overridden");
        Ok(())
    }

    /// Whether `item` is a member of the bucket
    pub async fn has(&self, item: &Cid) -> Result<bool, BucketError> {
        let _guard = self.gate.acquire().await;

        let root = self.get_or_create_root().await?;
        self.contains(&root, item).await
    }

    async fn contains(&self, root: &Cid, item: &Cid) -> Result<bool, BucketError> {
        match self.store.unixfs().stat(root, &item.to_string()).await {
            Ok(_) => Ok(true),
            Err(UnixfsError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_root(&self) -> Result<Option<Cid>, BucketError> {
        let Some(bytes) = self.store.datastore().get(&self.root_key).await? else {
            return Ok(None);
        };
        let root =
            Cid::try_from(bytes.as_slice()).map_err(|e| BucketError::CorruptRoot(e.to_string()))?;
        Ok(Some(root))
    }

    async fn get_or_create_root(&self) -> Result<Cid, BucketError> {
        if let Some(root) = self.load_root().await? {
            return Ok(root);
        }

        let root = self.store.unixfs().add_directory().await?;
        self.pin_root(&root).await?;
        self.persist_root(&root).await?;
        tracing::info!(%root, "initialised bucket");
        Ok(root)
    }

    /// Move the persisted root from `old` to `new`. The steps
    ///  run strictly in order: pin the new root, persist it,
    ///  unpin the old one. Once the new root is persisted the
    ///  transition is committed; a later failure leaves an
    ///  extra pin behind, never an unpinned root.
    async fn swap_root(&self, old: &Cid, new: &Cid) -> Result<(), BucketError> {
        if old == new {
            return self.persist_root(new).await;
        }
        self.pin_root(new).await?;
        self.persist_root(new).await?;
        self.unpin_root(old).await
    }

    async fn pin_root(&self, root: &Cid) -> Result<(), BucketError> {
        Ok(self.store.pins().add(root, BUCKET_ROOT_TAG).await?)
    }

    async fn persist_root(&self, root: &Cid) -> Result<(), BucketError> {
        self.store
            .datastore()
            .put(&self.root_key, root.to_bytes())
            .await?;
        tracing::debug!(%root, "persisted bucket root");
        Ok(())
    }

    /// Drop the pin held on behalf of a former root. A pin
    ///  with another tag (an item promoted to root by
    ///  [`Bucket::set_root`]) belongs to its owner and stays.
    async fn unpin_root(&self, root: &Cid) -> Result<(), BucketError> {
        let pins = self.store.pins();
        match pins.get(root).await? {
            Some(pin) if pin.tag == BUCKET_ROOT_TAG => {
                pins.rm(root).await?;
            }
            Some(pin) => {
                tracing::debug!(%root, tag = %pin.tag, "keeping foreign pin on former root");
            }
            None => {}
        }
        Ok(())
    }
}
