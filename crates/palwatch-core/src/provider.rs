//! Snapshot provider abstraction and the external command implementation.
//!
//! A provider turns a save file (plus an optional baseline snapshot) into a
//! [`Snapshot`]. The pipeline does not care how: in production it is an
//! external decoder run as a child process, in tests a fake.
//!
//! Time bounding is the caller's job (`tokio::time::timeout` around
//! [`SnapshotProvider::snapshot`]). [`CommandProvider`] spawns its child with
//! `kill_on_drop`, so an abandoned invocation takes its process with it and
//! its output can never be observed.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use palwatch_types::Snapshot;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::config::ProviderConfig;

/// Maximum characters of provider stderr carried in an error.
const MAX_STDERR_LEN: usize = 512;

/// Errors from a single provider invocation.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider process could not be started.
    #[error("failed to start provider `{command}`: {source}")]
    Spawn {
        /// The command that failed to start.
        command: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The provider exited unsuccessfully.
    #[error("provider exited with {status}: {stderr}")]
    Exit {
        /// Exit status description.
        status: String,
        /// Captured (truncated) standard error.
        stderr: String,
    },

    /// The provider output is not a snapshot document.
    #[error("provider output is not a valid snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The invocation exceeded its time budget.
    #[error("provider timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// A successfully decoded snapshot plus the document it came from.
///
/// The raw document is what gets persisted, so the provider can read it
/// back as a baseline on the next invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOutput {
    /// The typed snapshot.
    pub snapshot: Snapshot,
    /// The provider's document, verbatim.
    pub document: serde_json::Value,
}

impl ProviderOutput {
    /// Decode a provider's standard output.
    pub fn from_stdout(stdout: &[u8]) -> Result<Self, ProviderError> {
        let document: serde_json::Value = serde_json::from_slice(stdout)?;
        let snapshot = Snapshot::deserialize(&document)?;
        Ok(Self { snapshot, document })
    }
}

/// Something that can decode a save file into a [`Snapshot`].
pub trait SnapshotProvider: Send + Sync + 'static {
    /// Decode `save`, diffing against `baseline` when given.
    fn snapshot(
        &self,
        save: &Path,
        baseline: Option<&Path>,
    ) -> impl Future<Output = Result<ProviderOutput, ProviderError>> + Send;
}

/// Runs an external decoder as
/// `<command> <args...> <save> [<baseline_flag> <baseline>]` and reads one
/// JSON document from its standard output.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    command: String,
    args: Vec<String>,
    baseline_flag: String,
}

impl CommandProvider {
    /// Create a provider for an explicit command line.
    pub const fn new(command: String, args: Vec<String>, baseline_flag: String) -> Self {
        Self {
            command,
            args,
            baseline_flag,
        }
    }

    /// Create a provider from configuration.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.args.clone(),
            config.baseline_flag.clone(),
        )
    }

    /// The executable this provider runs.
    pub fn command(&self) -> &str {
        &self.command
    }

    fn build_command(&self, save: &Path, baseline: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args).arg(save);
        if let Some(baseline) = baseline {
            cmd.arg(&self.baseline_flag).arg(baseline);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl SnapshotProvider for CommandProvider {
    async fn snapshot(
        &self,
        save: &Path,
        baseline: Option<&Path>,
    ) -> Result<ProviderOutput, ProviderError> {
        debug!(
            command = self.command,
            save = %save.display(),
            baseline = ?baseline.map(Path::display),
            "invoking snapshot provider"
        );

        let output = self
            .build_command(save, baseline)
            .output()
            .await
            .map_err(|source| ProviderError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Exit {
                status: output.status.to_string(),
                stderr: stderr.trim().chars().take(MAX_STDERR_LEN).collect(),
            });
        }

        ProviderOutput::from_stdout(&output.stdout)
    }
}
