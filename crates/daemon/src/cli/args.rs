pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

use ipss_daemon::http_server::BasicAuth;

#[derive(Parser, Debug)]
#[command(name = "ipss")]
#[command(about = "A single mutable bucket over a content-addressed store")]
pub struct Args {
    /// Daemon to talk to (defaults to localhost on the configured api_port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the ipss config directory (defaults to ~/.ipss)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// API credentials as `user:password` (defaults to the configured ones)
    #[arg(long, global = true, env = "IPSS_API_BASIC_AUTH", hide_env_values = true)]
    pub basic_auth: Option<BasicAuth>,

    #[command(subcommand)]
    pub command: crate::Command,
}
