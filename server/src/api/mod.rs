//! API routing
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`accounts`] - role resolution and account transitions
//! - [`parcels`] - parcel request lifecycle
//! - [`assets`] - asset catalog
//! - [`asset_requests`] - asset request lifecycle
//! - [`payments`] - checkout sessions and payment reconciliation

pub mod accounts;
pub mod asset_requests;
pub mod assets;
pub mod health;
pub mod parcels;
pub mod payments;

use axum::Router;
use axum::middleware as axum_middleware;
use http::HeaderName;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::utils::AppError;

/// Merge all resource routers
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(accounts::router())
        .merge(parcels::router())
        .merge(assets::router())
        .merge(asset_requests::router())
        .merge(payments::router())
}

/// Build a fully configured application with all middleware.
///
/// `require_auth` is applied at the router level; it skips public routes
/// internally.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
}

/// Request ID generator (UUID v4)
#[derive(Clone, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        http::HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Parse a comma-separated status list from a query parameter
pub(crate) fn parse_status_list<T>(raw: &str) -> Result<Vec<T>, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(AppError::validation))
        .collect()
}
