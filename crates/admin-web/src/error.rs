//! Error types for the admin web interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors returned by admin handlers.
///
/// Inbox reads never fail; these cover request validation and writes the
/// storage layer refused.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The request was malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A write could not be stored.
    #[error("Not saved: {0}")]
    NotSaved(String),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::NotSaved(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AdminError::BadRequest(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                msg.clone()
            }
            AdminError::NotSaved(msg) => {
                tracing::warn!("Write not saved: {}", msg);
                msg.clone()
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
