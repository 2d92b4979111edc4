//! Implementation of the `datastream run` command.
//!
//! # Shutdown order
//!
//! 1. The engine returns (cycle limit, stop signal, or bootstrap failure)
//! 2. The lock manager is closed, failing any straggling waiters
//! 3. The logger performs its final flush

use crate::cli::RunArgs;
use datastream::config::{DEFAULT_CONFIG_FILE, StreamConfig};
use datastream::domain::SyntheticFactory;
use datastream::error::{Result, StreamError};
use datastream::locks::LockManager;
use datastream::logging::{Logger, LoggerConfig};
use datastream::store::RecordStore;
use datastream::stream::{RunSummary, StreamEngine};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const LOG_CONTEXT: &str = "Engine";

/// Execute the `datastream run` command.
///
/// # Exit Codes
///
/// - 0: Stopped by signal or cycle limit
/// - 1: Bootstrap write failed
/// - 2: Invalid configuration
/// - 4: Bootstrap lock timeout
pub async fn cmd_run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let cancel = CancellationToken::new();
    run_engine(config, cancel).await.map(|_| ())
}

/// Load the config file and apply command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<StreamConfig> {
    let mut config = match &args.config {
        Some(path) => StreamConfig::load(path)?,
        None => StreamConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
    };

    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = dir.clone();
    }
    if let Some(cycles) = args.cycles {
        config.max_cycles = Some(cycles);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.quiet {
        config.console_output = false;
    }

    config.validate()?;
    Ok(config)
}

/// Wire the components together, run the engine, and tear everything down.
async fn run_engine(config: StreamConfig, cancel: CancellationToken) -> Result<RunSummary> {
    let logger = Logger::start(LoggerConfig::from_stream_config(&config));
    let locks = Arc::new(LockManager::new(config.lock_timeout()));
    let store = RecordStore::from_config(&config, Arc::clone(&locks), logger.clone());
    let factory = SyntheticFactory::new(config.seed);
    let mut engine = StreamEngine::new(store, logger.clone(), config, Box::new(factory));

    let signals = spawn_signal_listener(cancel.clone(), logger.clone());
    let result = engine.run(&cancel).await;
    signals.abort();

    match &result {
        Ok(summary) => {
            let report = serde_json::to_string(summary).unwrap_or_default();
            logger.info(
                format!(
                    "Engine {} ({}): {}",
                    engine.phase(),
                    engine.ended_by().map_or("cycle limit".to_string(), |p| p.to_string()),
                    report
                ),
                Some(LOG_CONTEXT),
            );
        }
        Err(StreamError::Cancelled) => {
            logger.warning("Engine stopped before streaming began", Some(LOG_CONTEXT));
        }
        Err(e) => logger.error_with("Engine stopped on a fatal error", e, Some(LOG_CONTEXT)),
    }

    locks.close();
    logger.shutdown().await;
    result
}

/// Cancel `cancel` on Ctrl+C or SIGTERM.
fn spawn_signal_listener(cancel: CancellationToken, logger: Logger) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = stop_signal() => {
                logger.warning("Stop signal received; finishing in-flight work", Some(LOG_CONTEXT));
                cancel.cancel();
            }
        }
    })
}

async fn stop_signal() {
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}
