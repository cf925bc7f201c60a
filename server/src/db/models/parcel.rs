//! Parcel Request Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::ParcelStatus;
use surrealdb::RecordId;

use super::serde_helpers;

/// Parcel request ID type
pub type ParcelId = RecordId;

/// A parcel move/assignment record, retained indefinitely as audit trail.
///
/// Invariant: `assigned_user_id` is set if and only if
/// `status ∈ {assigned, employee_arriving, completed}`. Both fields change
/// in the same conditional write (`ParcelRepository::assign`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelRequest {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ParcelId>,
    /// Owning HR principal
    pub hr_email: String,
    pub target_employee_email: String,
    pub status: ParcelStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub assigned_user_id: Option<RecordId>,
}

impl ParcelRequest {
    /// Check the assignee/status invariant (used by tests and the repair
    /// path, the store never persists a violation through `assign`).
    pub fn invariant_holds(&self) -> bool {
        self.assigned_user_id.is_some() == self.status.carries_assignee()
    }
}
