//! Asset Request Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::AssetRequestStatus;
use surrealdb::RecordId;

use super::serde_helpers;

/// Asset request ID type
pub type AssetRequestId = RecordId;

/// An employee's request to be issued an asset.
///
/// Invariant: `approval_date` and `processed_by` are null while the request
/// is `pending` and are both stamped by the same conditional write that
/// moves it out of `pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRequest {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AssetRequestId>,
    pub requester_email: String,
    #[serde(with = "serde_helpers::record_id")]
    pub asset_id: RecordId,
    pub request_status: AssetRequestStatus,
    pub request_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    /// Approver identity (email), set together with `approval_date`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
}
