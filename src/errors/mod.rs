/// Unified error handling module
use crate::domain::{DecisionAction, DecisionStatus};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("External API error: {0}")]
    ExternalApi(#[from] reqwest::Error),
    #[error("Backend returned status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Cannot {action} a decision that is {from}")]
    InvalidTransition {
        from: DecisionStatus,
        action: DecisionAction,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable code for the error payload
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ExternalApi(e) => match e.status().map(|s| s.as_u16()) {
                Some(404) => "UPSTREAM_404",
                Some(429) => "UPSTREAM_429",
                Some(500..=599) => "UPSTREAM_5XX",
                _ if e.is_timeout() => "UPSTREAM_TIMEOUT",
                _ => "UPSTREAM_ERROR",
            },
            ApiError::Upstream { status: 404, .. } => "UPSTREAM_404",
            ApiError::Upstream { status: 429, .. } => "UPSTREAM_429",
            ApiError::Upstream {
                status: 500..=599, ..
            } => "UPSTREAM_5XX",
            ApiError::Upstream { .. } => "UPSTREAM_ERROR",
            ApiError::BackendUnavailable(_) => "UPSTREAM_502",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        // Errors travel as HTTP 200 with ok=false; the dashboard branches on `ok`
        (StatusCode::OK, Json(error_response)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
