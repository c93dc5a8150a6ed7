//! Push and query servers for the palwatch save observer.
//!
//! Two Axum servers run side by side:
//!
//! - **Push** (`WebSocket`, routes `/` and `/ws`): every connection gets a
//!   greeting with the current world state and recent events, then one
//!   message per emitted event, via the [`BroadcastHub`].
//! - **Query** (HTTP): `GET /status`, `GET /history` and `GET /health`
//!   serve point-in-time copies of the shared state.
//!
//! # Architecture
//!
//! The daemon publishes each pipeline event into the hub, which records it
//! in the event history and fans it out to subscriber queues without ever
//! awaiting a client. Each `WebSocket` task drains its own queue, so a slow
//! client only ever delays itself.
//!
//! [`BroadcastHub`]: hub::BroadcastHub

pub mod error;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use hub::{BroadcastHub, Subscription};
pub use router::{build_push_router, build_query_router};
pub use server::ServerError;
pub use startup::{ObserverHandles, StartupError, spawn_observer};
pub use state::AppState;
