//! Routing of settled file changes by role.
//!
//! A settled change to the primary save becomes a deep-parse request on the
//! pipeline queue. Any other `.sav` change becomes one lightweight
//! `file_changed` event. Everything else is ignored.
//!
//! The parse queue holds a single pending request. A primary-save change
//! that arrives while one is already queued is coalesced into it: the queued
//! parse will read the file as it is when the parse starts, which already
//! includes the newer write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use palwatch_types::{Event, FileChangedEvent, FileRole};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::classify::{classify_path, display_name};
use crate::sink::EventSink;

/// Pending deep-parse requests the queue can hold.
pub const PARSE_QUEUE_DEPTH: usize = 1;

/// What the router did with a settled change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// A deep parse was queued.
    DeepParse,
    /// A deep parse was already queued; this change rides along with it.
    Coalesced,
    /// The pipeline is gone; a degraded event was emitted instead.
    PipelineUnavailable,
    /// A lightweight `file_changed` event was emitted for this role.
    FileChanged(FileRole),
    /// Not a save file.
    Ignored,
}

/// Create the deep-parse request queue.
pub fn parse_queue() -> (mpsc::Sender<PathBuf>, mpsc::Receiver<PathBuf>) {
    mpsc::channel(PARSE_QUEUE_DEPTH)
}

/// Dispatches settled changes to the pipeline or the event sink.
pub struct ChangeRouter<S> {
    sink: Arc<S>,
    parse_queue: mpsc::Sender<PathBuf>,
}

impl<S: EventSink> ChangeRouter<S> {
    /// Create a router feeding `parse_queue` and emitting into `sink`.
    pub const fn new(sink: Arc<S>, parse_queue: mpsc::Sender<PathBuf>) -> Self {
        Self { sink, parse_queue }
    }

    /// Route one settled change.
    pub async fn route(&self, path: &Path) -> RouteDecision {
        let Some(role) = classify_path(path) else {
            debug!(path = %path.display(), "ignoring non-save file");
            return RouteDecision::Ignored;
        };

        if role.is_primary() {
            return self.request_parse(path).await;
        }

        let event = FileChangedEvent::changed(&display_name(path), role, Utc::now());
        self.sink.emit(Event::from(event)).await;
        debug!(path = %path.display(), ?role, "file change emitted");
        RouteDecision::FileChanged(role)
    }

    async fn request_parse(&self, path: &Path) -> RouteDecision {
        match self.parse_queue.try_send(path.to_path_buf()) {
            Ok(()) => {
                debug!(path = %path.display(), "deep parse queued");
                RouteDecision::DeepParse
            }
            Err(TrySendError::Full(_)) => {
                debug!(path = %path.display(), "deep parse already queued, coalescing");
                RouteDecision::Coalesced
            }
            Err(TrySendError::Closed(_)) => {
                warn!(path = %path.display(), "deep-parse pipeline is not running");
                let event = FileChangedEvent::degraded(
                    &display_name(path),
                    String::from("deep-parse pipeline is not running"),
                    Utc::now(),
                );
                self.sink.emit(Event::from(event)).await;
                RouteDecision::PipelineUnavailable
            }
        }
    }
}
