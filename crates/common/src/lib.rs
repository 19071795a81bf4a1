/**
 * Immutable block storage keyed by content
 *  identifier. In-memory and on-disk backends.
 */
pub mod blockstore;
/**
 * The bucket controller: a single mutable
 *  collection of items maintained by swapping
 *  a persisted root pointer.
 */
pub mod bucket;
/**
 * CARv1 archive import.
 */
pub mod car;
/**
 * Small mutable key/value state: the root
 *  pointer and pin records.
 */
pub mod datastore;
pub mod gate;
pub mod gc;
/**
 * Content identifiers and the node formats
 *  we store behind them.
 */
pub mod linked_data;
pub mod pins;
/**
 * Bundle of the storage backends and the
 *  views over them.
 */
pub mod store;
pub mod unixfs;
/**
 * Build version information captured
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::blockstore::{Blockstore, BlockstoreError, FsBlockstore, MemoryBlockstore};
    pub use crate::bucket::{
        AddError, Added, Bucket, BucketError, Listing, RemoveError, Removed,
    };
    pub use crate::datastore::{Datastore, DatastoreError, Key, MemoryDatastore};
    pub use crate::gate::{GateError, MutationGate};
    pub use crate::linked_data::{parse_cid, Cid, CidError};
    pub use crate::pins::{Pin, Pins};
    pub use crate::store::{Store, StoreBuilder};
    pub use crate::version::build_info;
}
