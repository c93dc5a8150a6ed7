//! palwatch daemon.
//!
//! Watches a Palworld save directory, deep-parses the world save through an
//! external snapshot provider, and serves the resulting events live over
//! `WebSocket` and on demand over HTTP.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`palwatch.yaml` + `PALWATCH_*` overrides)
//! 2. Initialize structured logging (tracing)
//! 3. Register the recursive watch on the save directory
//! 4. Open the snapshot store and adopt the newest snapshot as baseline
//! 5. Bind and spawn the push and query servers
//! 6. Spawn the deep-parse worker and the debounce loop
//! 7. Run until Ctrl-C / SIGTERM or until a task stops

mod error;
mod observer_sink;

use std::sync::Arc;

use palwatch_core::config::{LoggingConfig, PalwatchConfig};
use palwatch_core::pipeline::DeepParsePipeline;
use palwatch_core::provider::CommandProvider;
use palwatch_core::retention::RetentionStore;
use palwatch_core::route::{ChangeRouter, parse_queue};
use palwatch_core::watch::ChangeDetector;
use palwatch_observer::startup::spawn_observer;
use palwatch_observer::state::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::DaemonError;
use crate::observer_sink::ObserverSink;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the save directory cannot
/// be watched, a listen address is unavailable, or a task stops
/// unexpectedly.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configuration comes first: it decides the log level.
    let config = PalwatchConfig::load()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        watch_root = %config.watch.root.display(),
        debounce_ms = config.watch.debounce_ms,
        push_addr = %config.server.push_addr,
        query_addr = %config.server.query_addr,
        "palwatch starting"
    );

    if let Err(e) = run(&config).await {
        error!(error = %e, "palwatch stopped with error");
        return Err(e.into());
    }
    info!("palwatch stopped");
    Ok(())
}

/// `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: &PalwatchConfig) -> Result<(), DaemonError> {
    // 3. Watch registration failures are fatal before anything is served.
    let detector = ChangeDetector::new(&config.watch.root)?;

    // 4. Snapshot store.
    let retention = RetentionStore::open(config.retention.dir.clone(), config.retention.keep).await?;
    info!(
        dir = %retention.dir().display(),
        keep = config.retention.keep,
        has_baseline = retention.baseline().is_some(),
        "snapshot store ready"
    );

    // 5. Servers.
    let state = Arc::new(AppState::new(config.watch.root.clone(), &config.history));
    let mut observer = spawn_observer(&config.server, Arc::clone(&state)).await?;

    // 6. Pipeline.
    let sink = Arc::new(ObserverSink::new(Arc::clone(&state)));
    let (parse_tx, parse_rx) = parse_queue();
    let provider = CommandProvider::from_config(&config.provider);
    info!(
        command = provider.command(),
        timeout_ms = config.provider.timeout_ms,
        "snapshot provider configured"
    );
    let pipeline = DeepParsePipeline::new(
        provider,
        retention,
        Arc::clone(&state.world),
        Arc::clone(&sink),
        config.provider.timeout(),
    );
    let router = ChangeRouter::new(sink, parse_tx);

    let mut pipeline_task = tokio::spawn(pipeline.run(parse_rx));
    let window = config.watch.debounce();
    let mut watch_task = tokio::spawn(async move { detector.run(window, &router).await });
    info!("palwatch running");

    // 7. Run until told to stop.
    let outcome = tokio::select! {
        signal = shutdown_signal() => signal,
        _ = &mut watch_task => Err(DaemonError::TaskExited("change detector")),
        _ = &mut pipeline_task => Err(DaemonError::TaskExited("deep-parse pipeline")),
        _ = &mut observer.push => Err(DaemonError::TaskExited("push server")),
        _ = &mut observer.query => Err(DaemonError::TaskExited("query server")),
    };

    info!("shutting down");
    watch_task.abort();
    pipeline_task.abort();
    observer.abort();
    outcome
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() -> Result<(), DaemonError> {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
        terminate.recv().await;
        Ok::<(), DaemonError>(())
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), DaemonError>>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map_err(DaemonError::Signal),
        result = terminate => result,
    }
}
