use std::sync::Arc;

use crate::blockstore::{Blockstore, MemoryBlockstore};
use crate::car::{import_car, CarError, CarImport};
use crate::datastore::{Datastore, MemoryDatastore};
use crate::gc::{collect_garbage, GcError, GcReport};
use crate::pins::Pins;
use crate::unixfs::{Unixfs, DEFAULT_CHUNK_SIZE};

/// Builder for a [`Store`]. Any backend left unset
///  falls back to an in-memory one.
#[derive(Debug)]
pub struct StoreBuilder {
    blocks: Option<Arc<dyn Blockstore>>,
    datastore: Option<Arc<dyn Datastore>>,
    chunk_size: usize,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self {
            blocks: None,
            datastore: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blockstore(mut self, blocks: Arc<dyn Blockstore>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn datastore(mut self, datastore: Arc<dyn Datastore>) -> Self {
        self.datastore = Some(datastore);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn build(self) -> Store {
        let blocks = self
            .blocks
            .unwrap_or_else(|| Arc::new(MemoryBlockstore::new()));
        let datastore = self
            .datastore
            .unwrap_or_else(|| Arc::new(MemoryDatastore::new()));

        Store {
            unixfs: Unixfs::new(blocks.clone(), self.chunk_size),
            pins: Pins::new(datastore.clone()),
            blocks,
            datastore,
        }
    }
}

/// The content-addressed node the bucket sits on: a
///  blockstore for immutable content, a datastore for the
///  little mutable state we keep, and the file system and
///  pin views over them. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    blocks: Arc<dyn Blockstore>,
    datastore: Arc<dyn Datastore>,
    unixfs: Unixfs,
    pins: Pins,
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// A store backed entirely by memory
    pub fn memory() -> Self {
        StoreBuilder::new().build()
    }

    pub fn blocks(&self) -> &Arc<dyn Blockstore> {
        &self.blocks
    }

    pub fn datastore(&self) -> &Arc<dyn Datastore> {
        &self.datastore
    }

    pub fn unixfs(&self) -> &Unixfs {
        &self.unixfs
    }

    pub fn pins(&self) -> &Pins {
        &self.pins
    }

    /// Reclaim every block not reachable from a pin.
    ///  Callers must keep mutations out while this runs.
    pub async fn gc(&self) -> Result<GcReport, GcError> {
        collect_garbage(&self.unixfs, &self.pins).await
    }

    pub async fn import_car(&self, data: &[u8]) -> Result<CarImport, CarError> {
        import_car(self.blocks.as_ref(), data).await
    }
}
