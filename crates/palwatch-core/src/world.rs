//! The single current [`WorldState`].
//!
//! [`WorldStateStore::replace`] is the only mutator and is called only by
//! the deep-parse pipeline after a successful parse. Readers always get a
//! copy of a complete record.

use palwatch_types::WorldState;
use tokio::sync::RwLock;

/// Holder of the current world state.
#[derive(Debug, Default)]
pub struct WorldStateStore {
    state: RwLock<WorldState>,
}

impl WorldStateStore {
    /// Create a store holding the empty initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current state.
    pub async fn get(&self) -> WorldState {
        self.state.read().await.clone()
    }

    /// Replace the whole state.
    pub async fn replace(&self, new_state: WorldState) {
        *self.state.write().await = new_state;
    }
}
