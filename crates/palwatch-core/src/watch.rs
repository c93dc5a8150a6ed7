//! Filesystem watching with per-path debouncing.
//!
//! [`ChangeDetector`] subscribes to the watch root recursively. Raw create
//! and data-modify notifications are forwarded on an unbounded channel to
//! [`run_debounce_loop`], which settles each path independently and hands
//! settled paths to the [`ChangeRouter`].
//!
//! The watch callback runs on the notifier's own thread and never blocks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::debounce::DebounceScheduler;
use crate::route::ChangeRouter;
use crate::sink::EventSink;

/// Errors that prevent watching from starting.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The watch root is missing or not a directory.
    #[error("watch root {} is not a directory", path.display())]
    MissingRoot {
        /// The configured root.
        path: PathBuf,
    },

    /// The platform notifier refused the subscription.
    #[error("failed to watch {}: {source}", path.display())]
    Notify {
        /// The configured root.
        path: PathBuf,
        /// The notifier error.
        source: notify::Error,
    },
}

/// A live recursive subscription to the watch root.
pub struct ChangeDetector {
    root: PathBuf,
    watcher: RecommendedWatcher,
    writes: mpsc::UnboundedReceiver<PathBuf>,
}

impl ChangeDetector {
    /// Start watching `root`. Notifications buffer until [`Self::run`].
    pub fn new(root: &Path) -> Result<Self, WatchError> {
        if !root.is_dir() {
            return Err(WatchError::MissingRoot {
                path: root.to_path_buf(),
            });
        }

        let (tx, writes) = mpsc::unbounded_channel();
        let notify_error = |source: notify::Error| WatchError::Notify {
            path: root.to_path_buf(),
            source,
        };

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for path in write_paths(&event) {
                        // Receiver gone means the detector is shutting down.
                        if tx.send(path).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "filesystem watch error"),
            })
            .map_err(notify_error)?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(notify_error)?;

        Ok(Self {
            root: root.to_path_buf(),
            watcher,
            writes,
        })
    }

    /// The watched directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Debounce and route changes until the notifier stops.
    pub async fn run<S: EventSink>(self, window: Duration, router: &ChangeRouter<S>) {
        let Self {
            root,
            watcher,
            writes,
        } = self;
        info!(
            root = %root.display(),
            debounce_ms = window.as_millis(),
            "watching for save changes"
        );
        run_debounce_loop(writes, window, router).await;
        drop(watcher);
        info!(root = %root.display(), "change detector stopped");
    }
}

/// Paths in `event` that count as writes.
///
/// Creates and content or name modifications count. Metadata-only changes
/// (mtime, permissions) and removals do not.
pub fn write_paths(event: &notify::Event) -> Vec<PathBuf> {
    let is_write = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(modify) => !matches!(modify, ModifyKind::Metadata(_)),
        _ => false,
    };
    if is_write {
        event.paths.clone()
    } else {
        Vec::new()
    }
}

/// Settle raw writes per path and route each settled path once.
///
/// Returns when `writes` closes. Changes still pending at that point are
/// dropped.
pub async fn run_debounce_loop<S: EventSink>(
    mut writes: mpsc::UnboundedReceiver<PathBuf>,
    window: Duration,
    router: &ChangeRouter<S>,
) {
    let mut scheduler = DebounceScheduler::new(window);
    debug!(
        window_ms = scheduler.window().as_millis(),
        "debounce loop started"
    );

    loop {
        let deadline = scheduler.next_deadline();

        tokio::select! {
            biased;

            maybe_path = writes.recv() => {
                let Some(path) = maybe_path else {
                    break;
                };
                let reset = scheduler.record_write(path.clone(), Instant::now());
                debug!(path = %path.display(), reset, "write observed");
            }

            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                for path in scheduler.take_due(Instant::now()) {
                    let decision = router.route(&path).await;
                    debug!(path = %path.display(), ?decision, "change settled");
                }
            }
        }
    }

    if scheduler.pending_count() > 0 {
        debug!(
            pending = scheduler.pending_count(),
            "dropping unsettled changes on shutdown"
        );
    }
}
