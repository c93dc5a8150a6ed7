//! Query API endpoint handlers.
//!
//! All handlers return point-in-time copies of the shared [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/status` | Current world state, uptime, history size, watch root |
//! | `GET` | `/history` | Full event history, most recent first |
//! | `GET` | `/health` | Liveness probe |
//!
//! Any other path or method is answered by [`not_found`].

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{Method, Uri};
use chrono::{DateTime, Utc};
use palwatch_types::{Event, WorldState};
use serde::Serialize;

use crate::error::ObserverError;
use crate::state::AppState;

/// Response body for `GET /status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// The current world view.
    pub world_state: WorldState,
    /// Whole seconds since startup.
    pub uptime: u64,
    /// Events currently held in history.
    pub event_history_count: usize,
    /// The watched directory.
    pub watching: String,
}

/// Response body for `GET /history`.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Every retained event, most recent first.
    pub events: Vec<Event>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the server answers.
    pub status: &'static str,
    /// Server time of the response.
    pub timestamp: DateTime<Utc>,
}

/// `GET /status`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        world_state: state.world.get().await,
        uptime: state.uptime_secs(),
        event_history_count: state.history.len().await,
        watching: state.watching.display().to_string(),
    })
}

/// `GET /history`
pub async fn history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        events: state.history.all().await,
    })
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

/// Fallback for unknown paths and unsupported methods.
pub async fn not_found(method: Method, uri: Uri) -> ObserverError {
    ObserverError::NotFound(format!("{method} {}", uri.path()))
}
