//! Parcel Request API Module

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Parcel router. `GET /api/parcels` is public; everything else goes
/// through the authentication middleware.
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/parcels", get(handler::list).post(handler::create))
        .route("/api/parcels/assigned", get(handler::list_assigned))
        .route("/api/parcels/{id}", axum::routing::delete(handler::delete))
        .route("/api/parcels/{id}/assign", post(handler::assign))
        .route("/api/parcels/{id}/status", patch(handler::update_status))
        .route("/api/parcels/{id}/repair", post(handler::repair))
}
