//! HTTP error response conversion
//!
//! Wrapper around `AppError` implementing `IntoResponse` (orphan rules keep
//! it out of the library crates). Sensitive variants render a generic body;
//! the full chain is logged here at the variant's log level.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inkwell_core::error::LogLevel;
use inkwell_core::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = self.0;

        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "Request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "Request failed"),
            LogLevel::Error => tracing::error!(error = %err, code = err.error_code(), "Request failed"),
        }

        let status =
            StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: err.client_message(),
            code: err.error_code().to_string(),
            details: if err.is_sensitive() {
                None
            } else {
                Some(err.to_string())
            },
        };

        (status, Json(body)).into_response()
    }
}
