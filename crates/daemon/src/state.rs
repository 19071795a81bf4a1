use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "ipss";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATASTORE_DIR_NAME: &str = "datastore";
pub const BLOCKSTORE_DIR_NAME: &str = "blockstore";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the API server binds to
    #[serde(default = "default_api_address")]
    pub api_address: String,
    /// Port the API server binds to
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Directory holding the SQLite datastore
    #[serde(default = "default_datastore_path")]
    pub datastore_path: PathBuf,
    /// Directory holding block files
    #[serde(default = "default_blockstore_path")]
    pub blockstore_path: PathBuf,
    /// Basic auth credentials as `user:password`
    #[serde(default = "default_basic_auth")]
    pub basic_auth: String,
    /// How long reclamation waits for the bucket lock
    #[serde(default = "default_gc_lock_timeout_ms")]
    pub gc_lock_timeout_ms: u64,
    /// Directory for log files (stdout only if unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_api_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    45849
}

fn default_datastore_path() -> PathBuf {
    PathBuf::from("./datastore")
}

fn default_blockstore_path() -> PathBuf {
    PathBuf::from("./blockstore")
}

fn default_basic_auth() -> String {
    "user:password".to_string()
}

fn default_gc_lock_timeout_ms() -> u64 {
    80
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_address: default_api_address(),
            api_port: default_api_port(),
            datastore_path: default_datastore_path(),
            blockstore_path: default_blockstore_path(),
            basic_auth: default_basic_auth(),
            gc_lock_timeout_ms: default_gc_lock_timeout_ms(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the ipss directory (~/.ipss)
    pub ipss_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the ipss directory path (custom or default ~/.ipss)
    pub fn ipss_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new ipss state directory. Unless a config is
    ///  given, the stores live inside the new directory.
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let ipss_dir = Self::ipss_dir(custom_path)?;

        if ipss_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&ipss_dir)?;

        let config = config.unwrap_or_else(|| AppConfig {
            datastore_path: ipss_dir.join(DATASTORE_DIR_NAME),
            blockstore_path: ipss_dir.join(BLOCKSTORE_DIR_NAME),
            ..AppConfig::default()
        });
        fs::create_dir_all(&config.datastore_path)?;
        fs::create_dir_all(&config.blockstore_path)?;

        let config_path = ipss_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            ipss_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the ipss directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let ipss_dir = Self::ipss_dir(custom_path)?;

        if !ipss_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = ipss_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            ipss_dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("ipss directory not initialized. Run 'ipss init' first")]
    NotInitialized,

    #[error("ipss directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_then_load() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("ipss");

        let state = AppState::init(Some(dir.clone()), None).unwrap();
        assert_eq!(state.config.datastore_path, dir.join(DATASTORE_DIR_NAME));
        assert!(state.config.blockstore_path.is_dir());

        let loaded = AppState::load(Some(dir.clone())).unwrap();
        assert_eq!(loaded.config, state.config);

        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_missing_dir() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            AppState::load(Some(temp.path().join("absent"))),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("api_port = 8080\n").unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.api_address, "0.0.0.0");
        assert_eq!(config.gc_lock_timeout_ms, 80);
        assert_eq!(config.basic_auth, "user:password");
    }
}
