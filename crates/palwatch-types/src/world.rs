//! The current world view derived from the latest successful parse.
//!
//! [`WorldState`] is replaced wholesale on every successful parse; there is
//! no field-level mutation API, so a reader can never see a record that
//! mixes two parse results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::snapshot::Snapshot;

/// A player entry as reported by the snapshot provider.
///
/// The host flag is derived by the provider. Both `camelCase` and
/// `snake_case` spellings are accepted on input so the provider document
/// can be read directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Character level.
    #[serde(default)]
    pub level: u32,
    /// Unique player identifier.
    #[serde(alias = "id")]
    pub uid: String,
    /// Whether this player hosts the world.
    #[serde(default, alias = "is_host")]
    pub is_host: bool,
}

/// The single current view of world facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WorldState {
    /// World identifier, if a parse has succeeded.
    pub world_id: Option<String>,
    /// Host player identifier.
    pub host_player: Option<String>,
    /// Players known to the world.
    pub players: Vec<Player>,
    /// Total pals in the world.
    pub pal_count: u32,
    /// Number of bases.
    pub base_count: u32,
    /// When the last successful parse completed.
    pub last_update: Option<DateTime<Utc>>,
}

impl WorldState {
    /// Derive a world state from a provider snapshot parsed at `parsed_at`.
    pub fn from_snapshot(snapshot: &Snapshot, parsed_at: DateTime<Utc>) -> Self {
        Self {
            world_id: snapshot.world_id.clone(),
            host_player: snapshot.host_player.clone(),
            players: snapshot.players.clone(),
            pal_count: snapshot.pal_count,
            base_count: u32::try_from(snapshot.bases.len()).unwrap_or(u32::MAX),
            last_update: Some(parsed_at),
        }
    }

    /// Whether any parse has populated this state yet.
    pub const fn is_populated(&self) -> bool {
        self.last_update.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty() {
        let state = WorldState::default();
        assert!(!state.is_populated());
        assert!(state.players.is_empty());
        assert_eq!(state.pal_count, 0);
    }

    #[test]
    fn from_snapshot_copies_every_field() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "world_id": "A1B2",
            "host_player": "0001",
            "players": [
                {"name": "Host", "level": 30, "uid": "0001", "is_host": true},
                {"name": "Guest", "level": 12, "uid": "0002"}
            ],
            "pal_count": 42,
            "bases": [{"id": "b1"}, {"id": "b2"}]
        }))
        .unwrap();
        let now = Utc::now();

        let state = WorldState::from_snapshot(&snapshot, now);

        assert_eq!(state.world_id.as_deref(), Some("A1B2"));
        assert_eq!(state.host_player.as_deref(), Some("0001"));
        assert_eq!(state.players.len(), 2);
        assert!(state.players.first().unwrap().is_host);
        assert!(!state.players.last().unwrap().is_host);
        assert_eq!(state.pal_count, 42);
        assert_eq!(state.base_count, 2);
        assert_eq!(state.last_update, Some(now));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let state = WorldState {
            world_id: Some(String::from("W")),
            pal_count: 3,
            ..WorldState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["worldId"], "W");
        assert_eq!(json["palCount"], 3);
        assert!(json["lastUpdate"].is_null());
        assert!(json.get("baseCount").is_some());
    }
}
