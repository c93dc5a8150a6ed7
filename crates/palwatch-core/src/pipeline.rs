//! Deep-parse pipeline for the primary save file.
//!
//! For each queued primary-save path:
//! 1. Invoke the snapshot provider with the current retention baseline,
//!    bounded by the configured timeout
//! 2. On success, persist the document as the new baseline, replace the
//!    world state, then emit one game event per reported diff (or a single
//!    `world_saved` event when there are none)
//! 3. On failure (error, timeout, malformed output), leave state and
//!    baseline untouched and emit one degraded `file_changed` event
//!
//! The pipeline consumes its queue one path at a time and owns the
//! retention store, so two parses can never race to move the baseline or
//! the world state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use palwatch_types::{Event, FileChangedEvent, GameEvent, WorldState};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::classify::display_name;
use crate::provider::{ProviderError, ProviderOutput, SnapshotProvider};
use crate::retention::RetentionStore;
use crate::sink::EventSink;
use crate::world::WorldStateStore;

/// Result of one deep-parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The snapshot was applied.
    Parsed {
        /// Events emitted for this parse (at least one).
        events: usize,
        /// Whether the snapshot became the new baseline on disk.
        persisted: bool,
    },
    /// The provider failed; a degraded event was emitted.
    Failed {
        /// The error carried by the degraded event.
        error: String,
    },
}

/// Serial worker that deep-parses primary save writes.
pub struct DeepParsePipeline<P, S> {
    provider: P,
    retention: RetentionStore,
    world: Arc<WorldStateStore>,
    sink: Arc<S>,
    parse_timeout: Duration,
}

impl<P, S> DeepParsePipeline<P, S>
where
    P: SnapshotProvider,
    S: EventSink,
{
    /// Create a pipeline. `retention` is moved in: the pipeline is its only
    /// writer.
    pub const fn new(
        provider: P,
        retention: RetentionStore,
        world: Arc<WorldStateStore>,
        sink: Arc<S>,
        parse_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            retention,
            world,
            sink,
            parse_timeout,
        }
    }

    /// The retention store, for inspection.
    pub const fn retention(&self) -> &RetentionStore {
        &self.retention
    }

    /// Process queued primary-save paths until the queue closes.
    pub async fn run(mut self, mut queue: mpsc::Receiver<PathBuf>) {
        info!(
            timeout_ms = self.parse_timeout.as_millis(),
            baseline = ?self.retention.baseline().map(Path::display),
            "deep-parse pipeline started"
        );
        while let Some(path) = queue.recv().await {
            self.handle_primary_save(&path).await;
        }
        info!("deep-parse pipeline stopped");
    }

    /// Parse one primary save and apply or report the result.
    pub async fn handle_primary_save(&mut self, path: &Path) -> ParseOutcome {
        let started = Instant::now();
        let baseline = self.retention.baseline().map(Path::to_path_buf);

        // On timeout the provider future is dropped; whatever it would have
        // produced is never applied.
        let result = timeout(
            self.parse_timeout,
            self.provider.snapshot(path, baseline.as_deref()),
        )
        .await
        .unwrap_or_else(|_| Err(ProviderError::Timeout(self.parse_timeout)));

        let elapsed_ms = started.elapsed().as_millis();
        match result {
            Ok(output) => {
                let outcome = self.apply(output).await;
                if let ParseOutcome::Parsed { events, persisted } = &outcome {
                    info!(
                        path = %path.display(),
                        events,
                        persisted,
                        elapsed_ms,
                        "primary save parsed"
                    );
                }
                outcome
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    elapsed_ms,
                    "primary save parse failed, emitting degraded event"
                );
                let error = e.to_string();
                let event = FileChangedEvent::degraded(&display_name(path), error.clone(), Utc::now());
                self.sink.emit(Event::from(event)).await;
                ParseOutcome::Failed { error }
            }
        }
    }

    async fn apply(&mut self, output: ProviderOutput) -> ParseOutcome {
        let parsed_at = Utc::now();

        let persisted = match self.retention.persist(&output.document, parsed_at).await {
            Ok(path) => {
                debug!(path = %path.display(), "snapshot retained as new baseline");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to retain snapshot, baseline left unchanged");
                false
            }
        };

        let world_state = WorldState::from_snapshot(&output.snapshot, parsed_at);
        self.world.replace(world_state.clone()).await;

        let diffs = output.snapshot.diff_events();
        if diffs.is_empty() {
            let event = GameEvent::world_saved(world_state, Utc::now());
            self.sink.emit(Event::from(event)).await;
            return ParseOutcome::Parsed {
                events: 1,
                persisted,
            };
        }

        for diff in diffs {
            let event = GameEvent::from_diff(diff, world_state.clone(), Utc::now());
            self.sink.emit(Event::from(event)).await;
        }
        ParseOutcome::Parsed {
            events: diffs.len(),
            persisted,
        }
    }
}
