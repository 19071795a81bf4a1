pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Bucket, Daemon, Health, Init, Mgr, Version};
