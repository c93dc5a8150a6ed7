//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Subscribers have no persisted identity; their IDs only live as long as
//! the push connection. UUID v7 keeps them time-ordered, which makes
//! connect/disconnect logs easy to follow.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a connected push subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SubscriberId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let first = SubscriberId::new();
        let second = SubscriberId::new();
        assert_ne!(first, second);
        assert_eq!(first.to_string(), first.into_inner().to_string());
    }
}
