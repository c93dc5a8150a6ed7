//! On-disk snapshot retention.
//!
//! Every successful parse is written as
//! `snapshot-YYYYMMDDTHHMMSS.mmmZ.json`, so lexical order of file names is
//! chronological order. The newest file is the diff baseline for the next
//! parse; only the `keep` newest files survive a prune.
//!
//! The store is owned by the deep-parse pipeline, which is its only writer.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

const FILE_PREFIX: &str = "snapshot-";
const FILE_SUFFIX: &str = ".json";

/// Errors from reading or writing the snapshot directory.
#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    /// A filesystem operation failed.
    #[error("snapshot store I/O error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The document could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Directory of retained snapshot documents.
#[derive(Debug)]
pub struct RetentionStore {
    dir: PathBuf,
    keep: usize,
    baseline: Option<PathBuf>,
}

impl RetentionStore {
    /// Open (creating if needed) the snapshot directory and adopt the newest
    /// existing snapshot as the baseline.
    pub async fn open(dir: impl Into<PathBuf>, keep: usize) -> Result<Self, RetentionError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| RetentionError::Io {
                path: dir.clone(),
                source,
            })?;

        let mut store = Self {
            dir,
            keep: keep.max(1),
            baseline: None,
        };
        store.baseline = store.list().await?.pop();
        debug!(
            dir = %store.dir.display(),
            baseline = ?store.baseline.as_deref().map(Path::display),
            "snapshot store opened"
        );
        Ok(store)
    }

    /// The snapshot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The current diff baseline, if any snapshot has been retained.
    pub fn baseline(&self) -> Option<&Path> {
        self.baseline.as_deref()
    }

    /// Retained snapshot files, oldest first.
    pub async fn list(&self) -> Result<Vec<PathBuf>, RetentionError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|source| io_error(&self.dir, source))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| io_error(&self.dir, source))?
        {
            let path = entry.path();
            if is_snapshot_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Write `document` as the snapshot taken at `taken_at`, make it the new
    /// baseline, and prune older snapshots beyond the retention count.
    ///
    /// The baseline only moves once the file is fully written. A failed
    /// prune is logged and does not fail the persist.
    pub async fn persist(
        &mut self,
        document: &serde_json::Value,
        taken_at: DateTime<Utc>,
    ) -> Result<PathBuf, RetentionError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let path = self.dir.join(snapshot_file_name(taken_at));
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| io_error(&path, source))?;

        self.baseline = Some(path.clone());

        if let Err(e) = self.prune().await {
            warn!(error = %e, "failed to prune old snapshots");
        }
        Ok(path)
    }

    /// Delete the oldest snapshots beyond the retention count. Returns how
    /// many were removed.
    ///
    /// The current baseline is never removed, even when a clock step makes
    /// its name sort before older snapshots.
    pub async fn prune(&self) -> Result<usize, RetentionError> {
        let files = self.list().await?;
        let excess = files.len().saturating_sub(self.keep);
        let candidates = files
            .iter()
            .filter(|path| self.baseline.as_deref() != Some(path.as_path()))
            .take(excess);

        let mut removed: usize = 0;
        for path in candidates {
            tokio::fs::remove_file(path)
                .await
                .map_err(|source| io_error(path, source))?;
            debug!(path = %path.display(), "pruned snapshot");
            removed = removed.saturating_add(1);
        }
        Ok(removed)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> RetentionError {
    RetentionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// File name for a snapshot taken at `taken_at`.
pub fn snapshot_file_name(taken_at: DateTime<Utc>) -> String {
    format!(
        "{FILE_PREFIX}{}{FILE_SUFFIX}",
        taken_at.format("%Y%m%dT%H%M%S%.3fZ")
    )
}

fn is_snapshot_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
}
