//! Asset Catalog API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Asset catalog router. `GET /api/assets` is public.
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/assets", get(handler::list).post(handler::create))
}
