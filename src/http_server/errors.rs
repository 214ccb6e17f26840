//! # HTTP Errors
//!
//! Error types for the dashboard routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};
use crate::report::ReportError;
use crate::rules::RuleError;
use crate::store::StoreError;

/// Result type for route handlers
pub type HttpResult<T> = Result<T, HttpError>;

/// Dashboard route errors
#[derive(Debug, Error)]
pub enum HttpError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Bad filter or query parameter
    #[error("{0}")]
    BadRequest(String),

    /// Rule name not registered
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Rule query failed
    #[error("{0}")]
    RuleFailed(String),

    /// Store or report failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::UnknownRule(_) => StatusCode::NOT_FOUND,
            HttpError::RuleFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReportError> for HttpError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Rule(rule_err) => rule_err.into(),
            err if err.is_client_error() => HttpError::BadRequest(err.to_string()),
            err => HttpError::Internal(err.to_string()),
        }
    }
}

impl From<RuleError> for HttpError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::UnknownRule(name) => HttpError::UnknownRule(name),
            RuleError::Failed { source, .. } => HttpError::RuleFailed(source.to_string()),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        HttpError::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<HttpError> for ErrorResponse {
    fn from(err: HttpError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            let reason = self.to_string();
            log_event_with_fields(
                Event::RequestFailed,
                &[("status", status.as_str()), ("reason", reason.as_str())],
            );
        }
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
