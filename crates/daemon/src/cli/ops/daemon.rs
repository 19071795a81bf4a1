use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use common::unixfs::DEFAULT_CHUNK_SIZE;
use ipss_daemon::state::{AppConfig, AppState, StateError};
use ipss_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server address (default from config)
    #[arg(long, env = "IPSS_API_ADDRESS")]
    pub api_address: Option<IpAddr>,

    /// Override API server port (default from config)
    #[arg(long, env = "IPSS_API_PORT")]
    pub api_port: Option<u16>,

    /// Override the datastore directory (default from config)
    #[arg(long, env = "IPSS_DATASTORE_PATH")]
    pub datastore_path: Option<PathBuf>,

    /// Override the blockstore directory (default from config)
    #[arg(long, env = "IPSS_BLOCKSTORE_PATH")]
    pub blockstore_path: Option<PathBuf>,

    /// How long reclamation waits for the bucket lock, in milliseconds
    #[arg(long)]
    pub gc_lock_timeout_ms: Option<u64>,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Daemon {
    /// Layer flags and env over the loaded config
    fn service_config(
        &self,
        config: AppConfig,
        ctx: &crate::cli::op::OpContext,
    ) -> Result<ServiceConfig, DaemonError> {
        let api_address = match self.api_address {
            Some(address) => address,
            None => config
                .api_address
                .parse()
                .map_err(|_| DaemonError::InvalidAddress(config.api_address.clone()))?,
        };

        Ok(ServiceConfig {
            listen_addr: SocketAddr::new(api_address, self.api_port.unwrap_or(config.api_port)),
            basic_auth: ctx.credentials.clone(),
            datastore_path: self
                .datastore_path
                .clone()
                .unwrap_or(config.datastore_path),
            blockstore_path: self
                .blockstore_path
                .clone()
                .unwrap_or(config.blockstore_path),
            chunk_size: DEFAULT_CHUNK_SIZE,
            gc_lock_timeout: Duration::from_millis(
                self.gc_lock_timeout_ms.unwrap_or(config.gc_lock_timeout_ms),
            ),
            log_level: self.log_level,
            log_dir: self.log_dir.clone().or(config.log_dir),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("invalid api address: {0}")]
    InvalidAddress(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // an uninitialised directory runs on defaults (./datastore, ./blockstore)
        let config = match AppState::load(ctx.config_path.clone()) {
            Ok(state) => state.config,
            Err(StateError::NotInitialized) => AppConfig::default(),
            Err(e) => return Err(e.into()),
        };

        let config = self.service_config(config, ctx)?;
        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
