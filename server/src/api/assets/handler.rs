//! Asset Catalog API Handlers

use axum::Json;
use axum::extract::State;
use shared::request::AssetCreate;
use shared::response::ApiResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Asset;
use crate::utils::{AppResult, ok};

/// GET /api/assets - List the asset catalog (public)
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<Asset>>>> {
    let assets = state.workflow.list_assets().await?;
    Ok(ok(assets))
}

/// POST /api/assets - Register an asset in the catalog (admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AssetCreate>,
) -> AppResult<Json<ApiResponse<Asset>>> {
    tracing::info!(
        principal = %user.email,
        asset_name = %payload.name,
        quantity = payload.available_quantity,
        "Creating asset"
    );

    let asset = state.workflow.create_asset(&user.email, payload).await?;
    Ok(ok(asset))
}
