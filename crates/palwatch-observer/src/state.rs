//! Shared application state for the push and query servers.
//!
//! [`AppState`] bundles the stores the pipeline writes (world state, event
//! history) with the [`BroadcastHub`] that fans events out. It is wrapped
//! in [`Arc`] and injected through Axum's `State` extractor; handlers only
//! ever take point-in-time copies.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use palwatch_core::config::HistoryConfig;
use palwatch_core::history::EventHistory;
use palwatch_core::world::WorldStateStore;

use crate::hub::BroadcastHub;

/// Shared state for both Axum applications.
pub struct AppState {
    /// Current world view, written by the deep-parse pipeline.
    pub world: Arc<WorldStateStore>,
    /// Recent events, most recent first.
    pub history: Arc<EventHistory>,
    /// Push subscriber registry.
    pub hub: BroadcastHub,
    /// Directory being watched, reported by `/status`.
    pub watching: PathBuf,
    started_at: Instant,
}

impl AppState {
    /// Create empty state for a daemon watching `watching`.
    pub fn new(watching: PathBuf, history: &HistoryConfig) -> Self {
        let world = Arc::new(WorldStateStore::new());
        let events = Arc::new(EventHistory::new(history.capacity));
        let hub = BroadcastHub::new(
            Arc::clone(&world),
            Arc::clone(&events),
            history.greeting_events,
            history.subscriber_backlog,
        );
        Self {
            world,
            history: events,
            hub,
            watching,
            started_at: Instant::now(),
        }
    }

    /// Whole seconds since this state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
