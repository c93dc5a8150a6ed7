//! The structured document returned by the external snapshot provider.
//!
//! The provider decodes a save file and prints one JSON document. When it
//! was handed a baseline it also reports the classified differences as
//! [`DiffEvent`]s. Field names follow the provider's `snake_case`
//! convention; `camelCase` aliases are accepted too.

use serde::{Deserialize, Serialize};

use crate::event::Priority;
use crate::world::Player;

/// A decoded save snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// World identifier.
    #[serde(default, alias = "worldId")]
    pub world_id: Option<String>,
    /// Host player identifier.
    #[serde(default, alias = "hostPlayer")]
    pub host_player: Option<String>,
    /// Players present in the save.
    #[serde(default)]
    pub players: Vec<Player>,
    /// Total pals in the save.
    #[serde(default, alias = "palCount")]
    pub pal_count: u32,
    /// Base records. Only the count is used by the observer.
    #[serde(default)]
    pub bases: Vec<serde_json::Value>,
    /// Differences against the baseline, present only when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<DiffEvent>>,
}

impl Snapshot {
    /// The reported differences, empty when the provider reported none.
    pub fn diff_events(&self) -> &[DiffEvent] {
        self.events.as_deref().unwrap_or_default()
    }
}

/// A single classified difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEvent {
    /// Machine-readable event type (e.g. `pal_caught`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Grouping category (e.g. `pal`, `player`, `base`).
    #[serde(default = "default_category")]
    pub category: String,
    /// Human-readable description.
    pub message: String,
    /// Importance of the change.
    #[serde(default)]
    pub priority: Priority,
}

fn default_category() -> String {
    "general".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_document_with_events() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "world_id": "W1",
                "host_player": "0001",
                "players": [{"name": "Ada", "level": 7, "uid": "0001", "is_host": true}],
                "pal_count": 12,
                "bases": [],
                "events": [
                    {"type": "pal_caught", "category": "pal", "message": "Caught Lamball Lv.5", "priority": "high"},
                    {"type": "level_up", "message": "Ada reached Lv.7"}
                ]
            }"#,
        )
        .unwrap();

        let events = snapshot.diff_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events.first().unwrap().event_type, "pal_caught");
        assert_eq!(events.first().unwrap().priority, Priority::High);
        assert_eq!(events.last().unwrap().category, "general");
        assert_eq!(events.last().unwrap().priority, Priority::Normal);
    }

    #[test]
    fn accepts_camel_case_aliases() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"worldId": "W2", "hostPlayer": "h", "palCount": 3,
                "players": [{"name": "Bo", "level": 1, "id": "p1", "isHost": false}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.world_id.as_deref(), Some("W2"));
        assert_eq!(snapshot.pal_count, 3);
        assert_eq!(snapshot.players.first().unwrap().uid, "p1");
        assert!(snapshot.diff_events().is_empty());
    }

    #[test]
    fn unknown_priority_reads_as_normal() {
        let event: DiffEvent = serde_json::from_str(
            r#"{"type": "base_built", "message": "New base", "priority": "urgent"}"#,
        )
        .unwrap();
        assert_eq!(event.priority, Priority::Normal);
    }

    #[test]
    fn rejects_players_without_identifier() {
        let result = serde_json::from_str::<Snapshot>(r#"{"players": [{"name": "NoId"}]}"#);
        assert!(result.is_err());
    }
}
