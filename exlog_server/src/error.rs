//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use exlog_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] exlog_core::Error),

    /// The request body or query could not be decoded
    #[error("{0}")]
    BadRequest(String),
}

/// Marks a response as produced by [`ApiError`]
///
/// Lets the legacy status middleware rewrite handler errors without touching
/// the router's own 404/405 responses.
#[derive(Clone, Copy, Debug)]
pub struct ErrorResponse;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidId | ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "Store error.");
            "An internal store error occurred".to_string()
        } else {
            tracing::warn!(error = %self, "Request failed.");
            self.to_string()
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        response.extensions_mut().insert(ErrorResponse);
        response
    }
}

/// Rewrites handler error responses to HTTP 200, keeping the `{error}` body
pub async fn legacy_error_status(mut response: Response) -> Response {
    if response.extensions().get::<ErrorResponse>().is_some() {
        *response.status_mut() = StatusCode::OK;
    }
    response
}
