//! Domain enums
//!
//! Closed sets for roles and entity lifecycle states. Every state-changing
//! write on the server is conditioned on one of these values, so the wire
//! representation (snake_case strings) is part of the storage contract.

use serde::{Deserialize, Serialize};

/// Account role, ordered by privilege.
///
/// `authorize` checks use the derived ordering:
/// `User < Employee < Hr < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Default for any account without an explicit grant
    #[default]
    User,
    Employee,
    Hr,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Employee => "employee",
            Role::Hr => "hr",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employee availability on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    Available,
    InDelivery,
    Unavailable,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Available => "available",
            WorkStatus::InDelivery => "in_delivery",
            WorkStatus::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parcel request lifecycle.
///
/// Legal transitions:
/// `pending -> assigned -> { employee_arriving -> completed | completed }`
/// and `pending -> rejected` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    Pending,
    Assigned,
    EmployeeArriving,
    Completed,
    Rejected,
}

impl ParcelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Pending => "pending",
            ParcelStatus::Assigned => "assigned",
            ParcelStatus::EmployeeArriving => "employee_arriving",
            ParcelStatus::Completed => "completed",
            ParcelStatus::Rejected => "rejected",
        }
    }

    /// True when a parcel in this status must carry an `assigned_user_id`.
    pub fn carries_assignee(&self) -> bool {
        matches!(
            self,
            ParcelStatus::Assigned | ParcelStatus::EmployeeArriving | ParcelStatus::Completed
        )
    }
}

impl std::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParcelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ParcelStatus::Pending),
            "assigned" => Ok(ParcelStatus::Assigned),
            "employee_arriving" => Ok(ParcelStatus::EmployeeArriving),
            "completed" => Ok(ParcelStatus::Completed),
            "rejected" => Ok(ParcelStatus::Rejected),
            other => Err(format!("unknown parcel status: {other}")),
        }
    }
}

/// Asset request lifecycle.
///
/// Legal transitions: `pending -> { approved -> returned | rejected }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRequestStatus {
    Pending,
    Approved,
    Rejected,
    Returned,
}

impl AssetRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRequestStatus::Pending => "pending",
            AssetRequestStatus::Approved => "approved",
            AssetRequestStatus::Rejected => "rejected",
            AssetRequestStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for AssetRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssetRequestStatus::Pending),
            "approved" => Ok(AssetRequestStatus::Approved),
            "rejected" => Ok(AssetRequestStatus::Rejected),
            "returned" => Ok(AssetRequestStatus::Returned),
            other => Err(format!("unknown asset request status: {other}")),
        }
    }
}

/// Status recorded on a payment record.
///
/// Records are only ever created from provider-confirmed sessions and are
/// immutable afterwards, so the only stored value is `paid`. The enum keeps
/// the field a closed set rather than a free string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_matches_privilege() {
        assert!(Role::User < Role::Employee);
        assert!(Role::Employee < Role::Hr);
        assert!(Role::Hr < Role::Admin);
        assert!(Role::Admin >= Role::Hr);
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn parcel_statuses_carrying_assignee() {
        assert!(!ParcelStatus::Pending.carries_assignee());
        assert!(ParcelStatus::Assigned.carries_assignee());
        assert!(ParcelStatus::EmployeeArriving.carries_assignee());
        assert!(ParcelStatus::Completed.carries_assignee());
        assert!(!ParcelStatus::Rejected.carries_assignee());
    }

    #[test]
    fn parse_statuses_from_str() {
        assert_eq!(
            "employee_arriving".parse::<ParcelStatus>(),
            Ok(ParcelStatus::EmployeeArriving)
        );
        assert!("shipped".parse::<ParcelStatus>().is_err());
        assert_eq!(
            "returned".parse::<AssetRequestStatus>(),
            Ok(AssetRequestStatus::Returned)
        );
    }

    #[test]
    fn snake_case_wire_format() {
        let json = serde_json::to_string(&ParcelStatus::EmployeeArriving)
            .expect("serialize parcel status");
        assert_eq!(json, "\"employee_arriving\"");
        let status: WorkStatus =
            serde_json::from_str("\"in_delivery\"").expect("deserialize work status");
        assert_eq!(status, WorkStatus::InDelivery);
    }
}
