//! Shared type definitions for the palwatch save observer.
//!
//! This crate is the single source of truth for the records that flow
//! between the observation pipeline and its subscribers. Wire types are
//! exported to `TypeScript` via `ts-rs` for dashboard clients.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`world`] -- The current world view ([`WorldState`], [`Player`])
//! - [`snapshot`] -- The document produced by the external snapshot provider
//! - [`event`] -- Emitted events and file roles
//! - [`message`] -- Push protocol messages sent to subscribers

pub mod event;
pub mod ids;
pub mod message;
pub mod snapshot;
pub mod world;

// Re-export all public types at crate root for convenience.
pub use event::{Event, FileChangedEvent, FileRole, GameEvent, Priority, WORLD_SAVED_EVENT_TYPE};
pub use ids::SubscriberId;
pub use message::{Greeting, PushMessage};
pub use snapshot::{DiffEvent, Snapshot};
pub use world::{Player, WorldState};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the push protocol types.

    #[test]
    fn export_bindings() {
        // Exporting writes the files to the `bindings/` directory relative
        // to the crate root.
        use ts_rs::TS;

        let _ = crate::world::Player::export_all();
        let _ = crate::world::WorldState::export_all();
        let _ = crate::event::Priority::export_all();
        let _ = crate::event::FileRole::export_all();
        let _ = crate::event::GameEvent::export_all();
        let _ = crate::event::FileChangedEvent::export_all();
        let _ = crate::event::Event::export_all();
        let _ = crate::message::Greeting::export_all();
        let _ = crate::message::PushMessage::export_all();
    }
}
