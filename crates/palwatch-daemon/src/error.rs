//! Error types for the palwatch daemon binary.
//!
//! [`DaemonError`] wraps every failure that can stop the daemon, so `main`
//! can propagate with `?` and exit non-zero.

/// Top-level error for the daemon binary.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: palwatch_core::config::ConfigError,
    },

    /// The save directory could not be watched.
    #[error("watch error: {source}")]
    Watch {
        /// The underlying watch error.
        #[from]
        source: palwatch_core::watch::WatchError,
    },

    /// The snapshot directory could not be opened.
    #[error("retention error: {source}")]
    Retention {
        /// The underlying retention error.
        #[from]
        source: palwatch_core::retention::RetentionError,
    },

    /// The push or query server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: palwatch_observer::StartupError,
    },

    /// Installing the shutdown signal handler failed.
    #[error("signal handler error: {0}")]
    Signal(std::io::Error),

    /// A long-running task stopped on its own.
    #[error("{0} task exited unexpectedly")]
    TaskExited(&'static str),
}
