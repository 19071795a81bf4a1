//! The bucket: one mutable, named collection of immutable items.
//!
//! The bucket's state is the identifier of a directory in the
//! content-addressed store, persisted under a single datastore key.
//! Mutations never touch that directory; they write a new one and
//! move the persisted pointer with a pin-persist-unpin swap, so a
//! concurrent reclamation pass never sees an unprotected root.

mod controller;
mod error;

pub use controller::{Added, Bucket, Listing, Removed, BUCKET_ROOT_NAMESPACES};
pub use error::{AddError, BucketError, RemoveError};
