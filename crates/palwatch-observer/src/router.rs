//! Axum router construction for the push and query servers.
//!
//! Both routers carry permissive CORS (any origin, method and header) and
//! HTTP request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the push (`WebSocket`) router.
///
/// - `GET /` -- push connection
/// - `GET /ws` -- push connection
pub fn build_push_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ws::ws_upgrade))
        .route("/ws", get(ws::ws_upgrade))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the query (HTTP) router.
///
/// - `GET /status` -- world state, uptime, history size, watch root
/// - `GET /history` -- full event history
/// - `GET /health` -- liveness
pub fn build_query_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/history", get(handlers::history))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
