//! Asset Request API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/asset-requests",
            get(handler::list).post(handler::create),
        )
        .route("/api/asset-requests/{id}/approve", post(handler::approve))
        .route("/api/asset-requests/{id}/reject", post(handler::reject))
        .route(
            "/api/asset-requests/{id}/return",
            post(handler::return_request),
        )
}
