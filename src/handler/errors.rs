use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::services::CoreError;

/// JSON error body returned by every endpoint. The `error_id` lets an
/// operator correlate a client report with the server logs.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error_id: String,
    pub status_code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error_id: Uuid::new_v4().to_string(),
            status_code: status_code.as_u16(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Maps a service-layer failure to an HTTP status. Typed failures pick
    /// their own status; anything else is a 500 and gets logged with the
    /// error id so the body never leaks internals.
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<CoreError>() {
            Some(CoreError::NotFound(msg)) => Self::not_found(msg.clone()),
            Some(CoreError::Conflict(msg)) => Self::conflict(msg.clone()),
            Some(CoreError::Invalid(msg)) => Self::bad_request(msg.clone()),
            Some(CoreError::Unauthorized(msg)) => Self::unauthorized(msg.clone()),
            None => {
                let response = Self::internal_server_error("Internal server error");
                tracing::error!(
                    error_id = %response.error_id,
                    error = %err,
                    "Unhandled service error"
                );
                response
            }
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
