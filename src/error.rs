//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::StoreError;

/// Body of every error response.
///
/// ```json
/// { "message": "unauthorized" }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Validation Errors**: malformed or missing input
/// - **Authentication Errors**: missing or unknown API key
/// - **Policy Errors**: intake is closed
/// - **Resource Errors**: id-addressed document does not exist
/// - **Store Errors**: any failure of the underlying store
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Store operation failed (connection error, query error, outage).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// API key is missing, empty or unknown.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("unauthorized")]
    Unauthorized,

    /// Intake is paused; new requests are refused.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("currently not accepting")]
    NotAccepting,

    /// No document matches the given identity or name.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("not found")]
    NotFound,

    /// A configuration document the service depends on has not been seeded.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("configuration '{0}' is missing")]
    MissingConfig(String),

    /// Request body, path or query parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("{0}")]
    InvalidRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotAccepting | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::MissingConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// Every error is logged here, once, with its full detail. The response body
/// carries a `message`; store failures are reported with a generic message so
/// driver details never reach clients.
///
/// # Status Code Mapping
///
/// - `InvalidRequest` → 400 Bad Request
/// - `NotAccepting` → 400 Bad Request
/// - `Unauthorized` → 401 Unauthorized
/// - `NotFound` → 404 Not Found
/// - `Store`, `MissingConfig` → 500 Internal Server Error
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                "error querying data".to_string()
            }
            other => {
                tracing::warn!(status = status.as_u16(), error = %other, "request rejected");
                other.to_string()
            }
        };

        (status, Json(ApiError { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotAccepting.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Store(StoreError::Unavailable("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn store_errors_do_not_leak_details() {
        let response =
            AppError::Store(StoreError::Unavailable("secret host".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["message"], "error querying data");
    }

    #[tokio::test]
    async fn intake_closed_message_is_exact() {
        let response = AppError::NotAccepting.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json, serde_json::json!({ "message": "currently not accepting" }));
    }
}
