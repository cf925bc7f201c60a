//! Workflow error types

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::payments::ProviderError;

/// Errors surfaced by the workflow engine.
///
/// Stable kinds per failure mode: callers can rely on the variant, not the
/// message. A duplicate payment is deliberately not an error here;
/// idempotent re-application is a success (`PaymentOutcome::already_applied`).
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The entity was not in the source state the transition requires.
    /// `current` carries the observed state so the caller can re-fetch.
    #[error("Invalid transition for {entity}: currently '{current}'")]
    InvalidTransition { entity: String, current: String },

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Payment not completed: {0}")]
    PaymentNotCompleted(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] RepoError),
}

impl From<ProviderError> for WorkflowError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Timeout(msg) | ProviderError::Transport(msg) => {
                WorkflowError::UpstreamUnavailable(msg)
            }
            ProviderError::SessionNotFound(id) => {
                WorkflowError::NotFound(format!("Checkout session {}", id))
            }
            ProviderError::Malformed(msg) => WorkflowError::UpstreamUnavailable(msg),
        }
    }
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
