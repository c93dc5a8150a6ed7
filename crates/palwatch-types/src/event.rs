//! Events emitted by the observation pipeline.
//!
//! Two kinds exist: a [`GameEvent`] derived from a successful parse (a diff
//! entry, or the generic "world saved" notice), and a [`FileChangedEvent`]
//! raised for auxiliary save files or for a primary save whose parse
//! failed. Both are immutable once emitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::snapshot::DiffEvent;
use crate::world::WorldState;

/// Event type of the generic notice emitted when a parse reports no diff.
pub const WORLD_SAVED_EVENT_TYPE: &str = "world_saved";

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Importance of a game event.
///
/// Unknown values reported by the provider read as [`Priority::Normal`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Routine housekeeping.
    Low,
    /// Notable change worth surfacing prominently.
    High,
    /// Ordinary gameplay change. Must stay last: it absorbs unknown values.
    #[default]
    #[serde(other)]
    Normal,
}

/// Role of a save file, derived from its name and containing directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FileRole {
    /// `Level.sav`, the authoritative world save.
    Level,
    /// `LevelMeta.sav`, world metadata.
    Meta,
    /// `LocalData.sav`, local player data.
    Local,
    /// `WorldOption.sav`, world settings.
    WorldOption,
    /// `GlobalPalStorage.sav`, storage shared across worlds.
    GlobalStorage,
    /// `UserOption.sav`, per-user settings.
    UserOption,
    /// `Players/<id>.sav`, a per-player save.
    Player,
    /// Any other `.sav` file.
    Unknown,
}

impl FileRole {
    /// Whether writes to this file trigger a deep parse.
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Level)
    }

    /// The role as reported in `fileType`, or `None` for unknown files.
    pub const fn file_type(self) -> Option<Self> {
        match self {
            Self::Unknown => None,
            other => Some(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Event records
// ---------------------------------------------------------------------------

/// A change derived from a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Machine-readable event type (e.g. `pal_caught`, `world_saved`).
    pub event_type: String,
    /// Grouping category.
    pub category: String,
    /// Human-readable description.
    pub message: String,
    /// Importance of the change.
    pub priority: Priority,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// World state as of emission.
    pub world_state: WorldState,
}

impl GameEvent {
    /// Build an event from a provider diff entry.
    pub fn from_diff(diff: &DiffEvent, world_state: WorldState, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_type: diff.event_type.clone(),
            category: diff.category.clone(),
            message: diff.message.clone(),
            priority: diff.priority,
            timestamp,
            world_state,
        }
    }

    /// The generic notice for a parse that reported no differences.
    pub fn world_saved(world_state: WorldState, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_type: WORLD_SAVED_EVENT_TYPE.to_owned(),
            category: "system".to_owned(),
            message: "World saved".to_owned(),
            priority: Priority::Low,
            timestamp,
            world_state,
        }
    }
}

/// A save file changed without (or without successful) deep parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FileChangedEvent {
    /// File name (no directory).
    pub file: String,
    /// Role of the file, omitted for unrecognized `.sav` files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub file_type: Option<FileRole>,
    /// Human-readable description.
    pub message: String,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Why deep parsing failed, for degraded primary-save events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl FileChangedEvent {
    /// A plain change notice for an auxiliary save file.
    pub fn changed(file: &str, role: FileRole, timestamp: DateTime<Utc>) -> Self {
        Self {
            file: file.to_owned(),
            file_type: role.file_type(),
            message: format!("{file} changed"),
            timestamp,
            error: None,
        }
    }

    /// A degraded notice for a primary save whose parse failed.
    pub fn degraded(file: &str, error: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            file: file.to_owned(),
            file_type: Some(FileRole::Level),
            message: format!("{file} saved (details unavailable)"),
            timestamp,
            error: Some(error),
        }
    }

    /// Whether this event reports a failed parse.
    pub const fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Any event recorded in history and fanned out to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Event {
    /// A parse-derived change.
    GameEvent(GameEvent),
    /// A raw or degraded file change.
    FileChanged(FileChangedEvent),
}

impl Event {
    /// Emission time.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::GameEvent(e) => e.timestamp,
            Self::FileChanged(e) => e.timestamp,
        }
    }

    /// The message shown to users.
    pub fn message(&self) -> &str {
        match self {
            Self::GameEvent(e) => &e.message,
            Self::FileChanged(e) => &e.message,
        }
    }

    /// Wire tag of the event kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::GameEvent(_) => "game_event",
            Self::FileChanged(_) => "file_changed",
        }
    }
}

impl From<GameEvent> for Event {
    fn from(event: GameEvent) -> Self {
        Self::GameEvent(event)
    }
}

impl From<FileChangedEvent> for Event {
    fn from(event: FileChangedEvent) -> Self {
        Self::FileChanged(event)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn game_event_wire_shape() {
        let diff = DiffEvent {
            event_type: String::from("pal_caught"),
            category: String::from("pal"),
            message: String::from("Caught Lamball Lv.5"),
            priority: Priority::Normal,
        };
        let world = WorldState {
            pal_count: 5,
            ..WorldState::default()
        };
        let event = Event::from(GameEvent::from_diff(&diff, world, Utc::now()));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "game_event");
        assert_eq!(json["eventType"], "pal_caught");
        assert_eq!(json["category"], "pal");
        assert_eq!(json["message"], "Caught Lamball Lv.5");
        assert_eq!(json["priority"], "normal");
        assert_eq!(json["worldState"]["palCount"], 5);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn file_changed_omits_absent_fields() {
        let event = Event::from(FileChangedEvent::changed(
            "Backup.sav",
            FileRole::Unknown,
            Utc::now(),
        ));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "file_changed");
        assert_eq!(json["file"], "Backup.sav");
        assert_eq!(json["message"], "Backup.sav changed");
        assert!(json.get("fileType").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn local_data_reports_local_file_type() {
        let event = FileChangedEvent::changed("LocalData.sav", FileRole::Local, Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["fileType"], "local");
        assert!(!event.is_degraded());
    }

    #[test]
    fn degraded_event_carries_error() {
        let event = FileChangedEvent::degraded(
            "Level.sav",
            String::from("provider timed out after 30000ms"),
            Utc::now(),
        );
        assert!(event.is_degraded());
        let json = serde_json::to_value(Event::from(event)).unwrap();
        assert_eq!(json["fileType"], "level");
        assert_eq!(json["error"], "provider timed out after 30000ms");
    }

    #[test]
    fn world_saved_is_low_priority_system_event() {
        let event = GameEvent::world_saved(WorldState::default(), Utc::now());
        assert_eq!(event.event_type, WORLD_SAVED_EVENT_TYPE);
        assert_eq!(event.category, "system");
        assert_eq!(event.priority, Priority::Low);
    }

    #[test]
    fn only_level_is_primary() {
        assert!(FileRole::Level.is_primary());
        assert!(!FileRole::Meta.is_primary());
        assert!(!FileRole::Player.is_primary());
        assert_eq!(FileRole::Unknown.file_type(), None);
        assert_eq!(FileRole::WorldOption.file_type(), Some(FileRole::WorldOption));
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: Event = serde_json::from_str(
            r#"{"type": "file_changed", "file": "UserOption.sav", "fileType": "user_option",
                "message": "UserOption.sav changed", "timestamp": "2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), "file_changed");
        assert_eq!(event.message(), "UserOption.sav changed");
    }
}
