//! Configuration loading and typed config structures for palwatch.
//!
//! Configuration is read from an optional YAML file, then overridden by
//! environment variables, then validated. Every setting has a default, so
//! palwatch runs with no file at all.
//!
//! | Setting | Env var | Default |
//! |---------|---------|---------|
//! | `watch.root` | `PALWATCH_WATCH_DIR` | `./SaveGames` |
//! | `watch.debounce_ms` | `PALWATCH_DEBOUNCE_MS` | `2000` |
//! | `provider.command` | `PALWATCH_PARSER_CMD` | `python3` |
//! | `provider.timeout_ms` | `PALWATCH_PARSE_TIMEOUT_MS` | `30000` |
//! | `server.push_addr` | `PALWATCH_WS_ADDR` | `0.0.0.0:8765` |
//! | `server.query_addr` | `PALWATCH_HTTP_ADDR` | `0.0.0.0:8766` |
//! | `history.capacity` | `PALWATCH_HISTORY_CAPACITY` | `100` |
//! | `retention.dir` | `PALWATCH_SNAPSHOT_DIR` | `./snapshots` |
//! | `retention.keep` | `PALWATCH_SNAPSHOT_KEEP` | `5` |
//! | `logging.json` | `PALWATCH_LOG_JSON` | `false` |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "PALWATCH_CONFIG";

/// Config file read when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "palwatch.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid {var}: {message}")]
    Env {
        /// The offending variable.
        var: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// A setting is out of range.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Top-level palwatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PalwatchConfig {
    /// What to watch and how long to debounce.
    #[serde(default)]
    pub watch: WatchConfig,

    /// External snapshot provider invocation.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Listen addresses.
    #[serde(default)]
    pub server: ServerConfig,

    /// Event history sizing.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Snapshot retention.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PalwatchConfig {
    /// Load configuration the way the daemon does at startup.
    ///
    /// Reads the file named by `PALWATCH_CONFIG`, or `palwatch.yaml` when
    /// that is unset. A missing default file means "all defaults"; a missing
    /// explicitly named file is an error. Environment overrides are applied
    /// and the result validated.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::from_file(default_path);
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, apply environment overrides
    /// and validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Environment variables are not consulted.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Override settings from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides_with(|var| std::env::var(var).ok())
    }

    /// Override settings using `lookup` to resolve variable names.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PALWATCH_WATCH_DIR") {
            self.watch.root = PathBuf::from(val);
        }
        if let Some(val) = lookup("PALWATCH_DEBOUNCE_MS") {
            self.watch.debounce_ms = parse_env("PALWATCH_DEBOUNCE_MS", &val)?;
        }
        if let Some(val) = lookup("PALWATCH_PARSER_CMD") {
            self.provider.command = val;
        }
        if let Some(val) = lookup("PALWATCH_PARSE_TIMEOUT_MS") {
            self.provider.timeout_ms = parse_env("PALWATCH_PARSE_TIMEOUT_MS", &val)?;
        }
        if let Some(val) = lookup("PALWATCH_WS_ADDR") {
            self.server.push_addr = parse_env("PALWATCH_WS_ADDR", &val)?;
        }
        if let Some(val) = lookup("PALWATCH_HTTP_ADDR") {
            self.server.query_addr = parse_env("PALWATCH_HTTP_ADDR", &val)?;
        }
        if let Some(val) = lookup("PALWATCH_HISTORY_CAPACITY") {
            self.history.capacity = parse_env("PALWATCH_HISTORY_CAPACITY", &val)?;
        }
        if let Some(val) = lookup("PALWATCH_SNAPSHOT_DIR") {
            self.retention.dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("PALWATCH_SNAPSHOT_KEEP") {
            self.retention.keep = parse_env("PALWATCH_SNAPSHOT_KEEP", &val)?;
        }
        if let Some(val) = lookup("PALWATCH_LOG_JSON") {
            self.logging.json = parse_env("PALWATCH_LOG_JSON", &val)?;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::Invalid("watch.debounce_ms must be > 0".to_owned()));
        }
        if self.provider.timeout_ms == 0 {
            return Err(ConfigError::Invalid("provider.timeout_ms must be > 0".to_owned()));
        }
        if self.provider.command.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.command must not be empty".to_owned()));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid("history.capacity must be >= 1".to_owned()));
        }
        if self.history.subscriber_backlog == 0 {
            return Err(ConfigError::Invalid(
                "history.subscriber_backlog must be >= 1".to_owned(),
            ));
        }
        if self.retention.keep == 0 {
            return Err(ConfigError::Invalid("retention.keep must be >= 1".to_owned()));
        }
        if self.server.push_addr == self.server.query_addr {
            return Err(ConfigError::Invalid(format!(
                "server.push_addr and server.query_addr must differ (both {})",
                self.server.push_addr
            )));
        }
        Ok(())
    }
}

fn parse_env<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        message: format!("{value:?}: {e}"),
    })
}

/// Watch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchConfig {
    /// Root of the save directory tree, watched recursively.
    #[serde(default = "default_watch_root")]
    pub root: PathBuf,

    /// Quiet period after the last write before a change is routed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl WatchConfig {
    /// The debounce window as a [`Duration`].
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: default_watch_root(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// External snapshot provider configuration.
///
/// The provider is invoked as
/// `<command> <args...> <save_path> [<baseline_flag> <baseline_path>]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Executable to run.
    #[serde(default = "default_provider_command")]
    pub command: String,

    /// Arguments placed before the save path.
    #[serde(default = "default_provider_args")]
    pub args: Vec<String>,

    /// Flag that introduces the baseline snapshot path.
    #[serde(default = "default_baseline_flag")]
    pub baseline_flag: String,

    /// Upper bound on one invocation, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ProviderConfig {
    /// The invocation timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            command: default_provider_command(),
            args: default_provider_args(),
            baseline_flag: default_baseline_flag(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Listen addresses for the push and query servers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// `WebSocket` push endpoint.
    #[serde(default = "default_push_addr")]
    pub push_addr: SocketAddr,

    /// HTTP query endpoint.
    #[serde(default = "default_query_addr")]
    pub query_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            push_addr: default_push_addr(),
            query_addr: default_query_addr(),
        }
    }
}

/// Event history and fan-out sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Events retained in memory.
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,

    /// Recent events included in each greeting.
    #[serde(default = "default_greeting_events")]
    pub greeting_events: usize,

    /// Messages buffered per subscriber before events are skipped for it.
    #[serde(default = "default_subscriber_backlog")]
    pub subscriber_backlog: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            greeting_events: default_greeting_events(),
            subscriber_backlog: default_subscriber_backlog(),
        }
    }
}

/// Snapshot retention configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetentionConfig {
    /// Directory holding snapshot documents.
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,

    /// Number of snapshots kept.
    #[serde(default = "default_keep")]
    pub keep: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            dir: default_snapshot_dir(),
            keep: default_keep(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_watch_root() -> PathBuf {
    PathBuf::from("./SaveGames")
}

const fn default_debounce_ms() -> u64 {
    2_000
}

fn default_provider_command() -> String {
    "python3".to_owned()
}

fn default_provider_args() -> Vec<String> {
    vec!["parse_save.py".to_owned()]
}

fn default_baseline_flag() -> String {
    "--compare".to_owned()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

fn default_push_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8765))
}

fn default_query_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8766))
}

const fn default_history_capacity() -> usize {
    100
}

const fn default_greeting_events() -> usize {
    10
}

const fn default_subscriber_backlog() -> usize {
    64
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./snapshots")
}

const fn default_keep() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}
