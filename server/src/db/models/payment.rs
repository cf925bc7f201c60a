//! Payment Record Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::PaymentStatus;
use surrealdb::RecordId;

use super::serde_helpers;

/// Payment record ID type
pub type PaymentId = RecordId;

/// Durable trace of an externally confirmed payment. Insert-only; the
/// unique index on `transaction_id` is the idempotency key for the whole
/// reconciliation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PaymentId>,
    /// Provider settlement identifier (payment intent), globally unique
    pub transaction_id: String,
    pub hr_email: String,
    pub package_name: String,
    pub employee_limit: i64,
    /// Amount in minor currency units
    pub amount: i64,
    pub payment_date: DateTime<Utc>,
    pub status: PaymentStatus,
}
