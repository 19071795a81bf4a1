use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::http_server::BasicAuth;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address the API server listens on
    pub listen_addr: SocketAddr,
    /// credentials required on every mutating route
    pub basic_auth: BasicAuth,

    // data store configuration
    /// directory holding the SQLite datastore
    pub datastore_path: PathBuf,
    /// directory holding block files
    pub blockstore_path: PathBuf,
    /// fixed chunk size for stored items
    pub chunk_size: usize,
    /// how long reclamation waits for the bucket lock
    ///  before giving up
    pub gc_lock_timeout: Duration,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Path of the SQLite database inside the datastore directory
    pub fn sqlite_path(&self) -> PathBuf {
        self.datastore_path.join("datastore.sqlite")
    }
}
