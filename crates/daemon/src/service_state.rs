use std::sync::Arc;
use std::time::Duration;

use common::blockstore::{BlockstoreError, FsBlockstore};
use common::bucket::Bucket;
use common::gate::MutationGate;
use common::store::Store;

use crate::database::{Database, DatabaseSetupError};
use crate::http_server::BasicAuth;
use crate::ServiceConfig;

/// Everything a request handler needs. Cheap to clone; all
///  clones share one bucket and one mutation gate.
#[derive(Clone, Debug)]
pub struct State {
    bucket: Bucket,
    basic_auth: BasicAuth,
    gc_lock_timeout: Duration,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let sqlite_path = config.sqlite_path();
        tracing::info!(path = %sqlite_path.display(), "opening datastore");
        let database = Database::open(&sqlite_path).await?;

        tracing::info!(path = %config.blockstore_path.display(), "opening blockstore");
        let blocks = FsBlockstore::open(&config.blockstore_path).await?;

        let store = Store::builder()
            .blockstore(Arc::new(blocks))
            .datastore(Arc::new(database))
            .chunk_size(config.chunk_size)
            .build();

        Ok(Self::new(
            store,
            config.basic_auth.clone(),
            config.gc_lock_timeout,
        ))
    }

    pub fn new(store: Store, basic_auth: BasicAuth, gc_lock_timeout: Duration) -> Self {
        Self {
            bucket: Bucket::new(store, MutationGate::new()),
            basic_auth,
            gc_lock_timeout,
        }
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn store(&self) -> &Store {
        self.bucket.store()
    }

    pub fn gate(&self) -> &MutationGate {
        self.bucket.gate()
    }

    pub fn basic_auth(&self) -> &BasicAuth {
        &self.basic_auth
    }

    pub fn gc_lock_timeout(&self) -> Duration {
        self.gc_lock_timeout
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to setup the database: {0}")]
    DatabaseSetup(#[from] DatabaseSetupError),
    #[error("failed to setup the blockstore: {0}")]
    BlockstoreSetup(#[from] BlockstoreError),
}
