//! Unified Error Handling
//!
//! Application-wide error taxonomy and its HTTP mapping. Every layer error
//! (`RepoError`, `WorkflowError`, `ProviderError`) converges here before it
//! reaches a client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::response::ApiResponse;
use tracing::error;

use crate::db::repository::RepoError;
use crate::payments::ProviderError;
use crate::workflow::WorkflowError;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication Errors ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business Logic Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid transition for {entity}: currently '{current}'")]
    InvalidTransition { entity: String, current: String },

    #[error("Payment not completed: {0}")]
    PaymentNotCompleted(String),

    // ========== System Errors ==========
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "E3001", "Please login first".to_string())
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "E3002", "Invalid token".to_string())
            }
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "E3003", "Token expired".to_string())
            }

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Stale transition (409, body carries the observed state so the
            // caller can re-fetch and retry)
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "E0005", self.to_string())
            }

            // Payment still pending upstream (402, caller may poll)
            AppError::PaymentNotCompleted(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "E1001", msg.clone())
            }

            // Upstream timeout/unreachable (503)
            AppError::UpstreamUnavailable(msg) => {
                error!(target: "upstream", error = %msg, "Upstream unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "E5001",
                    "Upstream service unavailable".to_string(),
                )
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(code, message));
        (status, body).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Forbidden(msg) => AppError::Forbidden(msg),
            WorkflowError::NotFound(msg) => AppError::NotFound(msg),
            WorkflowError::InvalidTransition { entity, current } => {
                AppError::InvalidTransition { entity, current }
            }
            WorkflowError::OutOfStock(msg) => AppError::Conflict(msg),
            WorkflowError::PaymentNotCompleted(msg) => AppError::PaymentNotCompleted(msg),
            WorkflowError::UpstreamUnavailable(msg) => AppError::UpstreamUnavailable(msg),
            WorkflowError::Validation(msg) => AppError::Validation(msg),
            WorkflowError::Storage(repo) => repo.into(),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Timeout(msg) | ProviderError::Transport(msg) => {
                AppError::UpstreamUnavailable(msg)
            }
            ProviderError::SessionNotFound(msg) => AppError::NotFound(msg),
            ProviderError::Malformed(msg) => AppError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

/// Create a successful response carrying a warning (warning-carrying
/// success, e.g. a flagged consistency gap)
pub fn ok_with_warning<T: Serialize>(data: T, warning: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok_with_warning(data, warning))
}
