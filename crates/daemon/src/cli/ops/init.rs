use std::path::PathBuf;

use clap::Args;

use ipss_daemon::state::{
    AppConfig, AppState, StateError, BLOCKSTORE_DIR_NAME, DATASTORE_DIR_NAME,
};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port written to config.toml
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Datastore directory (defaults to <config dir>/datastore)
    #[arg(long)]
    pub datastore_path: Option<PathBuf>,

    /// Blockstore directory (defaults to <config dir>/blockstore)
    #[arg(long)]
    pub blockstore_path: Option<PathBuf>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let ipss_dir = AppState::ipss_dir(ctx.config_path.clone())?;
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port.unwrap_or(defaults.api_port),
            datastore_path: self
                .datastore_path
                .clone()
                .unwrap_or_else(|| ipss_dir.join(DATASTORE_DIR_NAME)),
            blockstore_path: self
                .blockstore_path
                .clone()
                .unwrap_or_else(|| ipss_dir.join(BLOCKSTORE_DIR_NAME)),
            ..defaults
        };

        let state = AppState::init(Some(ipss_dir), Some(config))?;
        Ok(format!(
            "Initialized ipss directory at {}\n  config:     {}\n  datastore:  {}\n  blockstore: {}",
            state.ipss_dir.display(),
            state.config_path.display(),
            state.config.datastore_path.display(),
            state.config.blockstore_path.display(),
        ))
    }
}
