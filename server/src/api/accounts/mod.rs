//! Account API Module

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/accounts/role", get(handler::resolve_role))
        .route("/api/accounts/{id}/role", patch(handler::update_role))
        .route(
            "/api/accounts/{id}/approve-employee",
            post(handler::approve_employee),
        )
}
