//! Account API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use shared::request::RoleUpdate;
use shared::response::ApiResponse;
use shared::types::{Role, WorkStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Account;
use crate::utils::{AppError, AppResult, ok};

/// Query for role resolution
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    /// Resolve another account's role (HR and above; defaults to the
    /// principal)
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub email: String,
    pub role: Role,
    pub work_status: WorkStatus,
}

/// GET /api/accounts/role - Resolve a principal's role and work status.
/// Unknown emails resolve to the default `user`.
pub async fn resolve_role(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<ApiResponse<RoleResponse>>> {
    let own = state.workflow.resolve_role(&user.email).await?;

    let (email, resolved) = match query.email {
        Some(other) if other != user.email => {
            if !own.meets(Role::Hr) {
                return Err(AppError::forbidden(
                    "Only HR and above may resolve another account's role",
                ));
            }
            let resolved = state.workflow.resolve_role(&other).await?;
            (other, resolved)
        }
        _ => (user.email, own),
    };

    Ok(ok(RoleResponse {
        email,
        role: resolved.role,
        work_status: resolved.work_status,
    }))
}

/// PATCH /api/accounts/{id}/role - Grant a role (admin)
pub async fn update_role(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<ApiResponse<Account>>> {
    tracing::info!(
        principal = %user.email,
        account_id = %id,
        role = %payload.role,
        "Updating account role"
    );

    let account = state
        .workflow
        .update_role(&user.email, &id, payload.role)
        .await?;
    Ok(ok(account))
}

/// POST /api/accounts/{id}/approve-employee - One-way `user -> employee`
/// transition, setting `work_status = available` in the same write (admin)
pub async fn approve_employee(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Account>>> {
    tracing::info!(principal = %user.email, account_id = %id, "Approving employee");

    let account = state.workflow.approve_employee(&user.email, &id).await?;
    Ok(ok(account))
}
