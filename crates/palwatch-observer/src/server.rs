//! Listener binding and serving.
//!
//! Binding is split from serving so startup can claim both listen
//! addresses before anything runs: an address already in use is a startup
//! failure, not a background task error.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

/// Errors that can occur when binding or running a server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The requested address.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("{name} server error: {source}")]
    Serve {
        /// Which server failed.
        name: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Bind a TCP listener on `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve `router` on an already bound listener until the task is dropped.
pub async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(server = name, %addr, "listening");
    }
    axum::serve(listener, router)
        .await
        .map_err(|source| ServerError::Serve { name, source })
}
