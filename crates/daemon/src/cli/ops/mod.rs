pub mod bucket;
pub mod daemon;
pub mod health;
pub mod init;
pub mod mgr;
pub mod version;

pub use bucket::Bucket;
pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use mgr::Mgr;
pub use version::Version;
