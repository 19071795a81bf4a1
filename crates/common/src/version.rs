use std::fmt::{self, Display};

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub rust_version: &'static str,
    pub target: &'static str,
}

impl Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ipss {} ({}, {} build for {}, {})",
            self.version, self.repo_version, self.build_profile, self.target, self.rust_version
        )
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        repo_version: option_env!("REPO_VERSION").unwrap_or("unknown"),
        build_profile: option_env!("BUILD_PROFILE").unwrap_or("unknown"),
        rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        target: option_env!("BUILD_TARGET").unwrap_or("unknown"),
    }
}
