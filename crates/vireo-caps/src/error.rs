//! Error types for the capability transport layer.
//!
//! [`CapsError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! queueing core itself is non-throwing; these errors exist only at the
//! HTTP edge.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the capability transport layer.
#[derive(Debug, thiserror::Error)]
pub enum CapsError {
    /// The capability token in the poll path is not bound to any agent.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// The agent has no registered queue.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for CapsError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::UnknownCapability(msg) | Self::UnknownAgent(msg) => {
                (StatusCode::NOT_FOUND, msg.clone())
            }
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
