//! Bounded, most-recent-first event history.
//!
//! Once the ring is full the oldest entry is dropped on every push. Nothing
//! is persisted; dropped events are gone.

use std::collections::VecDeque;

use palwatch_types::Event;
use tokio::sync::RwLock;

/// Ring of the most recent emitted events.
#[derive(Debug)]
pub struct EventHistory {
    capacity: usize,
    events: RwLock<VecDeque<Event>>,
}

impl EventHistory {
    /// Create an empty history holding at most `capacity` events.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Maximum number of retained events.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record `event` as the most recent entry.
    pub async fn push(&self, event: Event) {
        let mut events = self.events.write().await;
        events.push_front(event);
        events.truncate(self.capacity);
    }

    /// Up to `n` most recent events, most-recent-first.
    pub async fn recent(&self, n: usize) -> Vec<Event> {
        self.events.read().await.iter().take(n).cloned().collect()
    }

    /// Every retained event, most-recent-first.
    pub async fn all(&self) -> Vec<Event> {
        self.events.read().await.iter().cloned().collect()
    }

    /// Number of retained events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Whether no events are retained.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}
