//! Payments API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Payments router. `/api/payments/reconcile` is public: its authenticity
/// comes from re-fetching the session at the provider, not from a bearer
/// token.
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/payments", get(handler::list))
        .route(
            "/api/payments/checkout-session",
            post(handler::create_checkout_session),
        )
        .route("/api/payments/reconcile", post(handler::reconcile))
        .route(
            "/api/payments/repair/{transaction_id}",
            post(handler::repair),
        )
}
