//! HTTP error handling for the boundary layer
//!
//! Maps the domain error taxonomy onto transport-level responses. Every
//! domain error propagates here unchanged; nothing is swallowed or
//! downgraded on the way out.
//!
//! `Forbidden` deliberately maps to a detail-free body so a caller cannot
//! learn which check failed or whether a space exists.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pagespace_core::db::StoreError;
use pagespace_core::services::PageServiceError;
use serde::{Deserialize, Serialize};

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Missing or unresolvable authentication context
    pub fn unauthenticated() -> Self {
        Self::new("Authentication required", "UNAUTHENTICATED")
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "UNAUTHENTICATED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "PAGE_NOT_FOUND" | "SPACE_NOT_FOUND" | "HISTORY_NOT_FOUND" | "ORIGIN_NOT_FOUND"
            | "ORIGIN_MISSING" => StatusCode::NOT_FOUND,
            "INVALID_PARENT" | "INVALID_MOVE" | "ALREADY_IN_SPACE" | "INVALID_SYNC_TARGET"
            | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<PageServiceError> for HttpError {
    fn from(err: PageServiceError) -> Self {
        match &err {
            // Opaque: no message detail, no indication of which check failed
            PageServiceError::Forbidden => HttpError::new("Forbidden", "FORBIDDEN"),

            PageServiceError::PageNotFound { .. } => {
                HttpError::new(err.to_string(), "PAGE_NOT_FOUND")
            }
            PageServiceError::SpaceNotFound { .. } => {
                HttpError::new(err.to_string(), "SPACE_NOT_FOUND")
            }
            PageServiceError::HistoryNotFound { .. } => {
                HttpError::new(err.to_string(), "HISTORY_NOT_FOUND")
            }
            PageServiceError::OriginNotFound { .. } => {
                HttpError::new(err.to_string(), "ORIGIN_NOT_FOUND")
            }
            PageServiceError::OriginMissing { .. } => {
                HttpError::new(err.to_string(), "ORIGIN_MISSING")
            }
            PageServiceError::InvalidParent { .. } => {
                HttpError::new(err.to_string(), "INVALID_PARENT")
            }
            PageServiceError::InvalidMove { .. } => HttpError::new(err.to_string(), "INVALID_MOVE"),
            PageServiceError::AlreadyInSpace { .. } => {
                HttpError::new(err.to_string(), "ALREADY_IN_SPACE")
            }
            PageServiceError::InvalidSyncTarget { .. } => {
                HttpError::new(err.to_string(), "INVALID_SYNC_TARGET")
            }
            PageServiceError::ValidationFailed(_) => {
                HttpError::new(err.to_string(), "VALIDATION_ERROR")
            }
            PageServiceError::Store(StoreError::Conflict { .. }) => {
                HttpError::new("Concurrent modification, please retry", "CONFLICT")
            }
            PageServiceError::Store(_) => HttpError::new(err.to_string(), "DATABASE_ERROR"),
        }
    }
}
