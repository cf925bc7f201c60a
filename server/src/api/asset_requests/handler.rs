//! Asset Request API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use shared::request::AssetRequestCreate;
use shared::response::ApiResponse;
use shared::types::AssetRequestStatus;

use crate::api::parse_status_list;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::AssetRequest;
use crate::db::repository::AssetRequestFilter;
use crate::utils::{AppResult, ok, ok_with_warning};

/// Query filter for asset request listing
#[derive(Debug, Deserialize)]
pub struct AssetRequestQuery {
    /// Restrict to requests from this employee email (HR and above;
    /// lower principals are always restricted to their own)
    requester_email: Option<String>,
    /// Comma-separated status list, e.g. `pending,approved`
    statuses: Option<String>,
}

/// GET /api/asset-requests - List asset requests. Principals below HR
/// only see their own.
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<AssetRequestQuery>,
) -> AppResult<Json<ApiResponse<Vec<AssetRequest>>>> {
    let statuses = query
        .statuses
        .as_deref()
        .map(parse_status_list::<AssetRequestStatus>)
        .transpose()?;
    let filter = AssetRequestFilter {
        requester_email: query.requester_email,
        statuses,
    };

    let requests = state
        .workflow
        .list_asset_requests(&user.email, filter)
        .await?;
    Ok(ok(requests))
}

/// POST /api/asset-requests - Create a pending asset request (employee)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AssetRequestCreate>,
) -> AppResult<Json<ApiResponse<AssetRequest>>> {
    tracing::info!(
        principal = %user.email,
        asset_id = %payload.asset_id,
        "Creating asset request"
    );

    let request = state
        .workflow
        .create_asset_request(&user.email, payload)
        .await?;
    Ok(ok(request))
}

/// POST /api/asset-requests/{id}/approve - Approve a pending request,
/// consuming one unit of stock (admin)
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<AssetRequest>>> {
    tracing::info!(principal = %user.email, request_id = %id, "Approving asset request");

    let request = state
        .workflow
        .approve_asset_request(&user.email, &id)
        .await?;
    Ok(ok(request))
}

/// POST /api/asset-requests/{id}/reject - Reject a pending request (admin)
pub async fn reject(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<AssetRequest>>> {
    tracing::info!(principal = %user.email, request_id = %id, "Rejecting asset request");

    let request = state
        .workflow
        .reject_asset_request(&user.email, &id)
        .await?;
    Ok(ok(request))
}

/// POST /api/asset-requests/{id}/return - Return an approved asset,
/// restocking one unit (admin). A failed restock surfaces as a warning.
pub async fn return_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<AssetRequest>>> {
    tracing::info!(principal = %user.email, request_id = %id, "Returning asset request");

    let outcome = state
        .workflow
        .return_asset_request(&user.email, &id)
        .await?;

    Ok(match outcome.consistency_gap {
        Some(gap) => ok_with_warning(outcome.entity, gap),
        None => ok(outcome.entity),
    })
}
