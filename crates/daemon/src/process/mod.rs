pub mod utils;

use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::http_server;
use crate::{ServiceConfig, ServiceState};

/// How long in-flight requests get to drain after a shutdown signal
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_FILE_PREFIX: &str = "ipss.log";

/// A running daemon: the signal watcher plus the server tasks
pub struct ShutdownHandle {
    signal_task: JoinHandle<()>,
    tasks: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<()>,
}

impl ShutdownHandle {
    /// Wait for a shutdown signal (or [`ShutdownHandle::shutdown`]),
    ///  then for the servers to drain. Exits the process if they
    ///  do not drain in time.
    pub async fn wait(self) {
        let _ = self.signal_task.await;

        if tokio::time::timeout(DRAIN_TIMEOUT, join_all(self.tasks))
            .await
            .is_err()
        {
            tracing::error!(
                timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "servers did not drain in time"
            );
            std::process::exit(4);
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn level_filter(service_config: &ServiceConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(service_config.log_level.into())
        .from_env_lossy()
}

/// Daily-rolling plain-text log file under `log_dir`. Failing to
///  create the directory only costs the file output.
fn file_writer(log_dir: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("warning: cannot create log directory {:?}: {}", log_dir, e);
        return None;
    }
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber: compact stdout, plus a file
///  when a log directory is configured. The returned guards
///  flush the writers and must outlive the service.
fn init_logging(service_config: &ServiceConfig) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let (stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout)
        .with_filter(level_filter(service_config));

    let file_layer = service_config
        .log_dir
        .as_deref()
        .and_then(file_writer)
        .map(|(writer, guard)| {
            guards.push(guard);
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(level_filter(service_config))
        });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Open the stores and start serving the bucket API and gateway.
///  Exits the process if the stores cannot be opened.
pub async fn start_service(service_config: &ServiceConfig) -> (ServiceState, ShutdownHandle) {
    let (signal_task, shutdown_tx, shutdown_rx) = utils::graceful_shutdown_blocker();

    let state = match ServiceState::from_config(service_config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to open bucket stores");
            std::process::exit(3);
        }
    };

    let api_state = state.clone();
    let api_config = http_server::Config::new(service_config.listen_addr);
    let api_task = tokio::spawn(async move {
        if let Err(e) = http_server::run_api(api_config, api_state, shutdown_rx).await {
            tracing::error!(error = %e, "API server stopped");
        }
    });

    tracing::info!(addr = %service_config.listen_addr, "serving bucket API and gateway");

    let handle = ShutdownHandle {
        signal_task,
        tasks: vec![api_task],
        shutdown_tx,
    };
    (state, handle)
}

/// Run the daemon until a shutdown signal arrives
pub async fn spawn_service(service_config: &ServiceConfig) {
    let _guards = init_logging(service_config);
    let (_, handle) = start_service(service_config).await;
    handle.wait().await;
}
