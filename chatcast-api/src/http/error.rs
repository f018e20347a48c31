// HTTP error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

/// Application error with HTTP status code
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    /// Underlying cause, surfaced in the response body for 5xx failures.
    pub error: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.error = Some(cause.into());
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
            error: self.error,
        });

        (self.status, body).into_response()
    }
}

/// Convert relay errors to HTTP errors
impl From<chatcast_core::Error> for AppError {
    fn from(err: chatcast_core::Error) -> Self {
        use chatcast_core::Error;

        match err {
            Error::InvalidArgument(msg) => Self::bad_request(msg),
            Error::NoActiveSession => Self::bad_request("No active upstream session"),
            Error::UpstreamConnect(cause) => {
                Self::internal_server_error("Failed to start upstream connection")
                    .with_cause(cause)
            }
            Error::UpstreamDisconnect(cause) => {
                Self::internal_server_error("Failed to disconnect upstream session")
                    .with_cause(cause)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_maps_to_400() {
        let err: AppError =
            chatcast_core::Error::InvalidArgument("streamId is required".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "streamId is required");
        assert!(err.error.is_none());
    }

    #[test]
    fn test_no_active_session_maps_to_400() {
        let err: AppError = chatcast_core::Error::NoActiveSession.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_failures_map_to_500_with_cause() {
        let err: AppError =
            chatcast_core::Error::UpstreamConnect("handshake refused".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error.as_deref(), Some("handshake refused"));
    }
}
