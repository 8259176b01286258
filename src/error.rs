use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use crate::dispatch::DispatchError;

/// Application error type for the relay pipeline
///
/// Every rejection a client can see maps to exactly one variant, and every
/// variant maps to a stable `error_code` so callers can tell the classes apart
/// without parsing the human message.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Request Errors =====
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Assets not yet arrived: {0}")]
    NotReady(String),

    #[error("Gatekeeper rejected batch: {0}")]
    Gatekeeper(String),

    #[error("Rate limit exceeded: {0}")]
    TooManyRequests(String),

    // ===== Dispatch Errors =====
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    // ===== Collaborator Errors =====
    #[error("Chain RPC error: {0}")]
    Chain(String),

    // ===== Internal Server Errors =====
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NotReady(_) | AppError::Gatekeeper(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Chain(_) => StatusCode::BAD_GATEWAY,
            AppError::Dispatch(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Validation error: {}", msg),
            AppError::Auth(msg) => format!("Authentication failed: {}", msg),
            AppError::NotReady(msg) => format!("Assets not yet arrived: {}", msg),
            AppError::Gatekeeper(msg) => format!("Batch rejected: {}", msg),
            AppError::TooManyRequests(msg) => format!("Rate limit exceeded: {}", msg),
            AppError::Chain(_) => "Destination chain unavailable".to_string(),
            AppError::Dispatch(err) => format!("Dispatch failed: {}", err.cause_summary()),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::NotReady(_) => "NOT_READY",
            AppError::Gatekeeper(_) => "GATEKEEPER_REJECTED",
            AppError::TooManyRequests(_) => "RATE_LIMIT_EXCEEDED",
            AppError::Dispatch(_) => "DISPATCH_FAILED",
            AppError::Chain(_) => "CHAIN_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() || status == StatusCode::BAD_GATEWAY {
            tracing::error!(
                error = ?self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                error = %self,
                error_code = %code,
                "Authentication failed"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let response_body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(response_body)).into_response()
    }
}

// ============================================================================
// Helper functions for creating common errors
// ============================================================================

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        AppError::Auth(msg.into())
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        AppError::NotReady(msg.into())
    }

    pub fn gatekeeper(msg: impl Into<String>) -> Self {
        AppError::Gatekeeper(msg.into())
    }

    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        AppError::TooManyRequests(msg.into())
    }

    pub fn chain(msg: impl Into<String>) -> Self {
        AppError::Chain(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
