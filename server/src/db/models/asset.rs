//! Asset Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Asset ID type
pub type AssetId = RecordId;

/// A consumable/limited asset employees can request.
///
/// Invariant: `available_quantity >= 0`. The quantity only moves through
/// the conditional decrement/increment queries in `AssetRepository`, so a
/// stored negative value is unreachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AssetId>,
    pub name: String,
    pub available_quantity: i64,
}
