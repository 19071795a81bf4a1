use crate::datastore::DatastoreError;
use crate::linked_data::Cid;
use crate::pins::PinError;
use crate::unixfs::UnixfsError;

/// Failure of one of the collaborators the bucket sits on.
///  These are never expected; callers should surface them
///  as opaque server errors.
#[derive(Debug, thiserror::Error)]
pub enum BucketError {
    #[error("content store error: {0}")]
    Unixfs(#[from] UnixfsError),
    #[error("pin error: {0}")]
    Pin(#[from] PinError),
    #[error("root pointer store error: {0}")]
    Datastore(#[from] DatastoreError),
    #[error("persisted bucket root is not a valid identifier: {0}")]
    CorruptRoot(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AddError {
    /// The bytes hash to an item already in the bucket.
    ///  The bucket is left unchanged.
    #[error("content already exists: {0}")]
    ContentAlreadyExists(Cid),
    #[error(transparent)]
    Bucket(#[from] BucketError),
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveError {
    /// The item is not a member of the bucket.
    ///  The bucket is left unchanged.
    #[error("item does not exist: {0}")]
    ItemNotFound(Cid),
    #[error(transparent)]
    Bucket(#[from] BucketError),
}
