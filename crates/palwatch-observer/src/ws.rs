//! `WebSocket` push endpoint.
//!
//! Clients connect to `GET /` or `GET /ws`. Each connection registers with
//! the [`BroadcastHub`](crate::hub::BroadcastHub), receives its greeting and
//! then one JSON text frame per emitted event. The protocol is
//! server-to-client only: pings are answered, other client frames ignored.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::hub::Subscription;
use crate::state::AppState;

/// Upgrade an HTTP request to a push connection.
///
/// # Route
///
/// `GET /` and `GET /ws`
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Forward queued push messages until either side goes away, then
/// unregister.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let Subscription { id, mut rx } = state.hub.subscribe().await;
    debug!(subscriber = %id, "push client connected");

    loop {
        tokio::select! {
            queued = rx.recv() => {
                let Some(message) = queued else {
                    break;
                };
                let json = match serde_json::to_string(&message) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!(subscriber = %id, error = %e, "failed to serialize push message");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(subscriber = %id, "push client disconnected (send failed)");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %id, "push client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %id, "push client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %id, error = %e, "push connection error");
                        break;
                    }
                    _ => {
                        // Client text/binary/pong frames carry no meaning.
                    }
                }
            }
        }
    }

    state.hub.unsubscribe(id).await;
}
