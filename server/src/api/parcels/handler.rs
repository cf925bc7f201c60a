//! Parcel Request API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use shared::request::{ParcelAssign, ParcelCreate, ParcelStatusUpdate};
use shared::response::ApiResponse;
use shared::types::ParcelStatus;

use crate::api::parse_status_list;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::ParcelRequest;
use crate::db::repository::ParcelFilter;
use crate::utils::{AppResult, ok, ok_with_warning};

/// Query filter for parcel listing
#[derive(Debug, Deserialize)]
pub struct ParcelQuery {
    /// Restrict to parcels created by this HR email
    hr_email: Option<String>,
    /// Restrict to parcels assigned to this employee email
    assignee_email: Option<String>,
    /// Comma-separated status list, e.g. `pending,assigned`
    statuses: Option<String>,
}

impl ParcelQuery {
    fn into_filter(self) -> AppResult<ParcelFilter> {
        let statuses = self
            .statuses
            .as_deref()
            .map(parse_status_list::<ParcelStatus>)
            .transpose()?;
        Ok(ParcelFilter {
            hr_email: self.hr_email,
            assignee_email: self.assignee_email,
            statuses,
        })
    }
}

/// GET /api/parcels - List parcels, newest first (public)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ParcelQuery>,
) -> AppResult<Json<ApiResponse<Vec<ParcelRequest>>>> {
    let parcels = state.workflow.list_parcels(query.into_filter()?).await?;
    Ok(ok(parcels))
}

/// POST /api/parcels - Create a pending parcel request (HR)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ParcelCreate>,
) -> AppResult<Json<ApiResponse<ParcelRequest>>> {
    tracing::info!(
        principal = %user.email,
        target = %payload.target_employee_email,
        "Creating parcel request"
    );

    let parcel = state.workflow.create_parcel(&user.email, payload).await?;
    Ok(ok(parcel))
}

/// GET /api/parcels/assigned - Assigned parcels for the HR principal,
/// approval date descending
pub async fn list_assigned(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<ParcelRequest>>>> {
    let parcels = state.workflow.list_assigned_parcels(&user.email).await?;
    Ok(ok(parcels))
}

/// DELETE /api/parcels/{id} - Delete a parcel record (admin)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    tracing::info!(principal = %user.email, parcel_id = %id, "Deleting parcel");

    let deleted = state.workflow.delete_parcel(&user.email, &id).await?;
    Ok(ok(deleted))
}

/// POST /api/parcels/{id}/assign - Assign a pending parcel to an employee
/// (HR). A flagged consistency gap surfaces as a warning on the success
/// body.
pub async fn assign(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ParcelAssign>,
) -> AppResult<Json<ApiResponse<ParcelRequest>>> {
    tracing::info!(
        principal = %user.email,
        parcel_id = %id,
        employee = %payload.employee_email,
        "Assigning parcel"
    );

    let outcome = state
        .workflow
        .assign_parcel(&user.email, &id, &payload.employee_email)
        .await?;

    Ok(match outcome.consistency_gap {
        Some(gap) => ok_with_warning(outcome.entity, gap),
        None => ok(outcome.entity),
    })
}

/// PATCH /api/parcels/{id}/status - Move a parcel along its lifecycle (HR)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ParcelStatusUpdate>,
) -> AppResult<Json<ApiResponse<ParcelRequest>>> {
    tracing::info!(
        principal = %user.email,
        parcel_id = %id,
        status = %payload.status,
        "Updating parcel status"
    );

    let parcel = state
        .workflow
        .update_parcel_status(&user.email, &id, payload.status)
        .await?;
    Ok(ok(parcel))
}

/// POST /api/parcels/{id}/repair - Re-apply the assignee's work status
/// from the parcel's persisted state (HR). Returns whether a write landed.
pub async fn repair(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let applied = state.workflow.repair_assignment(&user.email, &id).await?;
    Ok(ok(applied))
}
