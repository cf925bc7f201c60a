//! Request payload types
//!
//! Closed set of tagged payloads accepted by the server, validated at the
//! boundary before any of them reaches the workflow engine.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{ParcelStatus, Role};

/// Create a parcel request (HR principal; owner email comes from the
/// authenticated principal, never from the body).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParcelCreate {
    #[validate(email)]
    pub target_employee_email: String,
}

/// Assign a parcel to an employee account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParcelAssign {
    #[validate(email)]
    pub employee_email: String,
}

/// Move a parcel along its lifecycle (assigned -> employee_arriving ->
/// completed, or pending -> rejected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelStatusUpdate {
    pub status: ParcelStatus,
}

/// Create an asset request (employee principal).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssetRequestCreate {
    #[validate(length(min = 1))]
    pub asset_id: String,
}

/// Register an asset in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssetCreate {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0))]
    pub available_quantity: i64,
}

/// Start a checkout session for a subscription package.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutSessionCreate {
    #[validate(length(min = 1))]
    pub package_name: String,
    /// Price in minor currency units (e.g. cents)
    #[validate(range(min = 1))]
    pub price: i64,
    #[validate(range(min = 1))]
    pub employee_limit: u32,
}

/// Payment-provider callback body carrying the session to reconcile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentReconcile {
    #[validate(length(min = 1))]
    pub session_id: String,
}

/// Admin role grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}
