//! Payments API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use shared::request::{CheckoutSessionCreate, PaymentReconcile};
use shared::response::ApiResponse;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::PaymentRecord;
use crate::payments::CreatedSession;
use crate::utils::{AppResult, ok, ok_with_warning};

/// Query filter for payment history
#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    /// Another account's email (admin only; defaults to the principal)
    email: Option<String>,
}

/// Body of a reconciliation response
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub record: PaymentRecord,
    /// True when this transaction had already been reconciled; the call
    /// is an idempotent re-application, not a new grant.
    pub already_applied: bool,
}

/// GET /api/payments - Payment history, newest first (HR; admins may
/// query another account via `?email=`)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<PaymentQuery>,
) -> AppResult<Json<ApiResponse<Vec<PaymentRecord>>>> {
    let records = state
        .workflow
        .list_payments(&user.email, query.email.as_deref())
        .await?;
    Ok(ok(records))
}

/// POST /api/payments/checkout-session - Start a hosted checkout session
/// for the HR principal
pub async fn create_checkout_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CheckoutSessionCreate>,
) -> AppResult<Json<ApiResponse<CreatedSession>>> {
    tracing::info!(
        principal = %user.email,
        package = %payload.package_name,
        "Creating checkout session"
    );

    let session = state
        .workflow
        .create_checkout_session(&user.email, payload)
        .await?;
    Ok(ok(session))
}

/// POST /api/payments/reconcile - Reconcile a provider callback into
/// entitlement state, exactly once (public; authenticated by re-fetching
/// the session upstream). Safe under at-least-once delivery.
pub async fn reconcile(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentReconcile>,
) -> AppResult<Json<ApiResponse<ReconcileResponse>>> {
    payload.validate()?;

    let outcome = state.workflow.reconcile_payment(&payload.session_id).await?;
    let body = ReconcileResponse {
        already_applied: outcome.already_applied,
        record: outcome.record,
    };

    Ok(match outcome.consistency_gap {
        Some(gap) => ok_with_warning(body, gap),
        None => ok(body),
    })
}

/// POST /api/payments/repair/{transaction_id} - Re-apply entitlements
/// from a persisted payment record (admin). Returns whether a write
/// landed.
pub async fn repair(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(transaction_id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    tracing::info!(
        principal = %user.email,
        transaction_id = %transaction_id,
        "Repairing entitlements"
    );

    let applied = state
        .workflow
        .repair_entitlements(&user.email, &transaction_id)
        .await?;
    Ok(ok(applied))
}
