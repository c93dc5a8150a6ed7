//! Server startup helper for embedding in the daemon.
//!
//! [`spawn_observer`] binds both listen addresses, then launches the push
//! and query servers on background tasks. The daemon holds the returned
//! handles alongside its pipeline tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use palwatch_core::config::ServerConfig;
use tokio::task::JoinHandle;
use tracing::error;

use crate::router::{build_push_router, build_query_router};
use crate::server::{ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the servers.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// A listen address could not be bound.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),

    /// Both servers were configured on the same address.
    #[error("push and query servers cannot share {0}")]
    SharedAddress(SocketAddr),
}

/// Running servers.
#[derive(Debug)]
pub struct ObserverHandles {
    /// Address the push server is bound to.
    pub push_addr: SocketAddr,
    /// Address the query server is bound to.
    pub query_addr: SocketAddr,
    /// Push server task.
    pub push: JoinHandle<()>,
    /// Query server task.
    pub query: JoinHandle<()>,
}

impl ObserverHandles {
    /// Stop both servers.
    pub fn abort(&self) {
        self.push.abort();
        self.query.abort();
    }
}

/// Bind both servers and spawn them on background tasks.
///
/// The servers run until the runtime shuts down or the handles are
/// aborted. Bound addresses are reported back, so port `0` may be used.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<ObserverHandles, StartupError> {
    if config.push_addr == config.query_addr && config.push_addr.port() != 0 {
        return Err(StartupError::SharedAddress(config.push_addr));
    }

    let push_listener = bind(config.push_addr).await?;
    let query_listener = bind(config.query_addr).await?;
    let push_addr = push_listener.local_addr().unwrap_or(config.push_addr);
    let query_addr = query_listener.local_addr().unwrap_or(config.query_addr);

    let push_router = build_push_router(Arc::clone(&state));
    let push = tokio::spawn(async move {
        if let Err(e) = serve("push", push_listener, push_router).await {
            error!(error = %e, "push server exited with error");
        }
    });

    let query_router = build_query_router(state);
    let query = tokio::spawn(async move {
        if let Err(e) = serve("query", query_listener, query_router).await {
            error!(error = %e, "query server exited with error");
        }
    });

    tracing::info!(%push_addr, %query_addr, "observer servers spawned");

    Ok(ObserverHandles {
        push_addr,
        query_addr,
        push,
        query,
    })
}
