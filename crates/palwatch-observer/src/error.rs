//! Error types for the query API.
//!
//! [`ObserverError`] converts into an Axum response with a JSON body of the
//! form `{"error": "...", "status": 404}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// No route matches the request.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ObserverError {
    /// The HTTP status this error maps to.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
