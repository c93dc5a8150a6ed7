//! Per-path debounce scheduling.
//!
//! [`DebounceScheduler`] maps each path with a pending change to the
//! deadline at which it should fire. It holds no timers: callers pass the
//! current instant in, ask for the earliest deadline, and take the paths
//! whose deadline has passed. The run loop in [`crate::watch`] drives it
//! with `tokio::time`.
//!
//! Invariants:
//! - at most one pending entry per path;
//! - a new write to a pending path moves its deadline to `now + window`;
//! - paths never influence each other's deadlines.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;

/// Debounce state keyed by path.
#[derive(Debug)]
pub struct DebounceScheduler {
    window: Duration,
    pending: HashMap<PathBuf, Instant>,
}

impl DebounceScheduler {
    /// Create an empty scheduler with a fixed quiet period.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    /// The configured quiet period.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record a write to `path` at `now`, (re)arming its deadline.
    ///
    /// Returns `true` if an already pending change was reset.
    pub fn record_write(&mut self, path: PathBuf, now: Instant) -> bool {
        let deadline = now.checked_add(self.window).unwrap_or(now);
        self.pending.insert(path, deadline).is_some()
    }

    /// The earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every path whose deadline is at or before `now`,
    /// earliest deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut due: Vec<(Instant, PathBuf)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, deadline)| (*deadline, path.clone()))
            .collect();
        due.sort();

        for (_, path) in &due {
            self.pending.remove(path);
        }
        due.into_iter().map(|(_, path)| path).collect()
    }

    /// Drop a pending change without firing it.
    pub fn cancel(&mut self, path: &Path) -> bool {
        self.pending.remove(path).is_some()
    }

    /// Whether `path` has a pending change.
    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains_key(path)
    }

    /// Number of paths with a pending change.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    fn path(name: &str) -> PathBuf {
        PathBuf::from("/saves").join(name)
    }

    #[test]
    fn empty_scheduler_has_no_deadline() {
        let mut scheduler = DebounceScheduler::new(WINDOW);
        assert!(scheduler.next_deadline().is_none());
        assert!(scheduler.take_due(Instant::now()).is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn nothing_fires_before_the_window_elapses() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(WINDOW);
        assert!(!scheduler.record_write(path("Level.sav"), start));

        assert!(scheduler.take_due(start + Duration::from_millis(299)).is_empty());
        assert_eq!(scheduler.take_due(start + WINDOW), vec![path("Level.sav")]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn burst_fires_once_timed_from_last_write() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(WINDOW);

        for step in 0..5 {
            let reset = scheduler.record_write(path("Level.sav"), start + Duration::from_millis(step * 100));
            assert_eq!(reset, step > 0);
        }
        assert_eq!(scheduler.pending_count(), 1);

        let last_write = start + Duration::from_millis(400);
        assert_eq!(scheduler.next_deadline(), Some(last_write + WINDOW));
        // The first write's deadline has long passed, but nothing fires yet.
        assert!(scheduler.take_due(start + WINDOW + Duration::from_millis(100)).is_empty());
        assert_eq!(scheduler.take_due(last_write + WINDOW).len(), 1);
        assert!(scheduler.take_due(last_write + WINDOW * 10).is_empty());
    }

    #[test]
    fn paths_debounce_independently() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(WINDOW);
        scheduler.record_write(path("LocalData.sav"), start);
        // Keep rewriting Level.sav; it must not hold LocalData.sav back.
        scheduler.record_write(path("Level.sav"), start + Duration::from_millis(200));
        scheduler.record_write(path("Level.sav"), start + Duration::from_millis(290));

        assert_eq!(scheduler.take_due(start + WINDOW), vec![path("LocalData.sav")]);
        assert!(scheduler.is_pending(&path("Level.sav")));
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(590)),
            vec![path("Level.sav")]
        );
    }

    #[test]
    fn due_paths_come_out_earliest_first() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(WINDOW);
        scheduler.record_write(path("b.sav"), start + Duration::from_millis(20));
        scheduler.record_write(path("a.sav"), start + Duration::from_millis(10));
        scheduler.record_write(path("c.sav"), start);

        let due = scheduler.take_due(start + Duration::from_secs(1));
        assert_eq!(due, vec![path("c.sav"), path("a.sav"), path("b.sav")]);
    }

    #[test]
    fn write_after_firing_starts_a_fresh_cycle() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(WINDOW);
        scheduler.record_write(path("Level.sav"), start);
        assert_eq!(scheduler.take_due(start + WINDOW).len(), 1);

        let again = start + WINDOW + Duration::from_millis(1);
        assert!(!scheduler.record_write(path("Level.sav"), again));
        assert_eq!(scheduler.next_deadline(), Some(again + WINDOW));
    }

    #[test]
    fn cancel_removes_pending_change() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(WINDOW);
        scheduler.record_write(path("Level.sav"), start);
        assert!(scheduler.cancel(&path("Level.sav")));
        assert!(!scheduler.cancel(&path("Level.sav")));
        assert!(scheduler.take_due(start + WINDOW).is_empty());
    }
}
