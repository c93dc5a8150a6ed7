//! Push protocol messages.
//!
//! Every message is a JSON object tagged by `type`:
//!
//! | `type` | Sent |
//! |--------|------|
//! | `greeting` | Once, immediately after connecting |
//! | `game_event` | For every parse-derived change |
//! | `file_changed` | For auxiliary saves and degraded primary saves |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::event::{Event, FileChangedEvent, GameEvent};
use crate::world::WorldState;

/// First message on every push connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Greeting {
    /// Welcome text.
    pub message: String,
    /// When the greeting was built.
    pub timestamp: DateTime<Utc>,
    /// Current world state at connect time.
    pub world_state: WorldState,
    /// Most recent history entries, most-recent-first.
    pub recent_events: Vec<Event>,
}

impl Greeting {
    /// Build a greeting for a newly connected subscriber.
    pub fn new(world_state: WorldState, recent_events: Vec<Event>, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: "Connected to palwatch".to_owned(),
            timestamp,
            world_state,
            recent_events,
        }
    }
}

/// A server-to-client push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PushMessage {
    /// Connection greeting.
    Greeting(Greeting),
    /// A parse-derived change.
    GameEvent(GameEvent),
    /// A raw or degraded file change.
    FileChanged(FileChangedEvent),
}

impl From<Event> for PushMessage {
    fn from(event: Event) -> Self {
        match event {
            Event::GameEvent(e) => Self::GameEvent(e),
            Event::FileChanged(e) => Self::FileChanged(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::event::FileRole;

    #[test]
    fn greeting_wire_shape() {
        let recent = vec![Event::from(FileChangedEvent::changed(
            "LevelMeta.sav",
            FileRole::Meta,
            Utc::now(),
        ))];
        let greeting = PushMessage::Greeting(Greeting::new(WorldState::default(), recent, Utc::now()));

        let json = serde_json::to_value(&greeting).unwrap();
        assert_eq!(json["type"], "greeting");
        assert!(json["message"].is_string());
        assert!(json["worldState"].is_object());
        assert_eq!(json["recentEvents"][0]["type"], "file_changed");
        assert_eq!(json["recentEvents"][0]["fileType"], "meta");
    }

    #[test]
    fn events_keep_their_tag_as_push_messages() {
        let event = Event::from(GameEvent::world_saved(WorldState::default(), Utc::now()));
        let from_event = serde_json::to_value(&event).unwrap();
        let from_message = serde_json::to_value(PushMessage::from(event)).unwrap();
        assert_eq!(from_event, from_message);
        assert_eq!(from_message["type"], "game_event");
    }
}
