use std::error::Error;
use std::path::PathBuf;

use url::Url;

use ipss_daemon::http_server::api::client::{ApiClient, ApiError};
use ipss_daemon::http_server::BasicAuth;
use ipss_daemon::state::{AppConfig, AppState};

/// Resolve the remote URL for the API client.
///
/// Priority: explicit `--remote` flag > config file `api_port` > the default port.
pub fn resolve_remote(
    explicit: Option<Url>,
    config_path: Option<PathBuf>,
) -> Result<Url, url::ParseError> {
    if let Some(url) = explicit {
        return Ok(url);
    }
    let api_port = AppState::load(config_path)
        .map(|state| state.config.api_port)
        .unwrap_or_else(|_| AppConfig::default().api_port);
    Url::parse(&format!("http://localhost:{}", api_port))
}

/// Resolve the API credentials.
///
/// Priority: explicit `--basic-auth` flag (or env) > config file > defaults.
pub fn resolve_credentials(
    explicit: Option<BasicAuth>,
    config_path: Option<PathBuf>,
) -> Result<BasicAuth, OpContextError> {
    if let Some(auth) = explicit {
        return Ok(auth);
    }
    let configured = AppState::load(config_path)
        .map(|state| state.config.basic_auth)
        .unwrap_or_else(|_| AppConfig::default().basic_auth);
    configured
        .parse()
        .map_err(|_| OpContextError::InvalidCredentials)
}

#[derive(Clone)]
pub struct OpContext {
    /// API client, authenticating with `credentials`
    pub client: ApiClient,
    /// Credentials the client sends; the daemon op serves with them
    pub credentials: BasicAuth,
    /// Optional custom config path (defaults to ~/.ipss)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(
        remote: Url,
        credentials: BasicAuth,
        config_path: Option<PathBuf>,
    ) -> Result<Self, OpContextError> {
        Ok(Self {
            client: ApiClient::new(&remote, Some(credentials.clone()))?,
            credentials,
            config_path,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpContextError {
    #[error("invalid remote url: {0}")]
    Remote(#[from] url::ParseError),
    #[error("configured basic_auth must look like 'user:password'")]
    InvalidCredentials,
    #[error("failed to create API client: {0}")]
    Client(#[from] ApiError),
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
