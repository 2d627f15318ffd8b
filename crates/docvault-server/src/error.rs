//! HTTP error types for the `docvault` server.
//!
//! Maps domain errors from `docvault-core` into appropriate HTTP
//! responses. Every error variant produces a JSON body with a
//! machine-readable `error` field and a human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use docvault_core::error::{SessionError, ShareError, UploadError, VerifyError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Client sent invalid input.
    BadRequest(String),
    /// No connected wallet session for the caller.
    Unauthorized(String),
    /// Requested resource not found.
    NotFound(String),
    /// A conflicting operation is already running.
    Conflict(String),
    /// Upload exceeds the size ceiling.
    PayloadTooLarge(String),
    /// An external gateway failed or stalled.
    UpstreamFailed(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            Self::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg)
            }
            Self::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, "upstream_failed", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::EmptyName => Self::BadRequest(err.to_string()),
            UploadError::FileTooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            UploadError::InFlight => Self::Conflict(err.to_string()),
            UploadError::Stage { .. } | UploadError::StageTimeout { .. } => {
                Self::UpstreamFailed(err.to_string())
            }
            UploadError::Registry(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ShareError> for AppError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::EmptyRecipient => Self::BadRequest(err.to_string()),
            ShareError::NotFound { .. } => Self::NotFound(err.to_string()),
            ShareError::Gateway(_) => Self::UpstreamFailed(err.to_string()),
        }
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::NotFound { .. } => Self::NotFound(err.to_string()),
            VerifyError::Gateway(_) => Self::UpstreamFailed(err.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::EmptyAddress => Self::BadRequest(err.to_string()),
            SessionError::NotConnected { .. } => Self::Unauthorized(err.to_string()),
        }
    }
}
