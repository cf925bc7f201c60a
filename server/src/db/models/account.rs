//! Account Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::{Role, WorkStatus};
use surrealdb::RecordId;

use super::serde_helpers;

/// Account ID type
pub type AccountId = RecordId;

/// Account record. Created on first sign-in, never hard-deleted.
///
/// `role` only ever changes through an explicit approval operation
/// (`update_role` / `approve_employee`), never by self-assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AccountId>,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub work_status: WorkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_package: Option<String>,
    #[serde(default)]
    pub employee_limit: i64,
    pub created_at: DateTime<Utc>,
}
