//! Parcel request state machine
//!
//! Transition table:
//!
//! | From | To | Actor |
//! |------|----|-------|
//! | pending | assigned | hr/admin (via `assign_parcel`, sets assignee) |
//! | pending | rejected | hr/admin |
//! | assigned | employee_arriving | hr/admin |
//! | assigned | completed | hr/admin |
//! | employee_arriving | completed | hr/admin |
//!
//! `pending -> assigned` carries a secondary write (target account
//! `work_status = in_delivery`). The two writes are one logical operation:
//! if the secondary fails the outcome is flagged with a consistency gap
//! and `repair_assignment` can re-apply it later.

use shared::types::{ParcelStatus, Role, WorkStatus};
use tracing::warn;

use super::{TransitionOutcome, Workflow, WorkflowError, WorkflowResult};
use crate::db::models::ParcelRequest;

/// Legal status-update transitions (assignment is separate: it also sets
/// the assignee and therefore goes through `assign_parcel`)
fn transition_allowed(from: ParcelStatus, to: ParcelStatus) -> bool {
    matches!(
        (from, to),
        (ParcelStatus::Pending, ParcelStatus::Rejected)
            | (ParcelStatus::Assigned, ParcelStatus::EmployeeArriving)
            | (ParcelStatus::Assigned, ParcelStatus::Completed)
            | (ParcelStatus::EmployeeArriving, ParcelStatus::Completed)
    )
}

impl Workflow {
    /// Assign a pending parcel to an employee account.
    ///
    /// Primary write: `pending -> assigned` CAS setting `assigned_user_id`
    /// and `approval_date`. Secondary write: target account
    /// `work_status = in_delivery`. A failed secondary write flags the
    /// outcome instead of rolling back the assignment.
    pub async fn assign_parcel(
        &self,
        principal: &str,
        parcel_id: &str,
        employee_email: &str,
    ) -> WorkflowResult<TransitionOutcome<ParcelRequest>> {
        self.authorize(principal, Role::Hr).await?;

        let target = self
            .accounts
            .find_by_email(employee_email)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Account {}", employee_email)))?;
        let target_id = target
            .id
            .ok_or_else(|| WorkflowError::Validation("Account record missing id".to_string()))?;

        let parcel = match self.parcels.assign(parcel_id, target_id.clone()).await? {
            Some(parcel) => parcel,
            None => {
                // CAS miss: one retry after a fresh read, then surface the
                // observed state
                let fresh = self
                    .parcels
                    .find_by_id(parcel_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("Parcel {}", parcel_id)))?;
                if fresh.status != ParcelStatus::Pending {
                    return Err(WorkflowError::InvalidTransition {
                        entity: format!("parcel {}", parcel_id),
                        current: fresh.status.to_string(),
                    });
                }
                self.parcels
                    .assign(parcel_id, target_id)
                    .await?
                    .ok_or_else(|| WorkflowError::InvalidTransition {
                        entity: format!("parcel {}", parcel_id),
                        current: fresh.status.to_string(),
                    })?
            }
        };

        match self
            .accounts
            .set_work_status(employee_email, WorkStatus::InDelivery)
            .await
        {
            Ok(true) => Ok(TransitionOutcome::clean(parcel)),
            Ok(false) => {
                let gap = format!(
                    "parcel {} assigned but account {} not found for work_status update",
                    parcel_id, employee_email
                );
                warn!(target: "workflow", parcel_id, employee_email, "{}", gap);
                Ok(TransitionOutcome::flagged(parcel, gap))
            }
            Err(e) => {
                let gap = format!(
                    "parcel {} assigned but work_status update for {} failed: {}",
                    parcel_id, employee_email, e
                );
                warn!(target: "workflow", parcel_id, employee_email, error = %e, "{}", gap);
                Ok(TransitionOutcome::flagged(parcel, gap))
            }
        }
    }

    /// Move a parcel along its lifecycle via the transition table above
    pub async fn update_parcel_status(
        &self,
        principal: &str,
        parcel_id: &str,
        to: ParcelStatus,
    ) -> WorkflowResult<ParcelRequest> {
        self.authorize(principal, Role::Hr).await?;

        let current = self
            .parcels
            .find_by_id(parcel_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Parcel {}", parcel_id)))?;

        if !transition_allowed(current.status, to) {
            return Err(WorkflowError::InvalidTransition {
                entity: format!("parcel {}", parcel_id),
                current: current.status.to_string(),
            });
        }

        if let Some(parcel) = self.parcels.transition(parcel_id, current.status, to).await? {
            return Ok(parcel);
        }

        // CAS miss: one retry against a fresh read
        let fresh = self
            .parcels
            .find_by_id(parcel_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Parcel {}", parcel_id)))?;
        if transition_allowed(fresh.status, to)
            && let Some(parcel) = self.parcels.transition(parcel_id, fresh.status, to).await?
        {
            return Ok(parcel);
        }

        Err(WorkflowError::InvalidTransition {
            entity: format!("parcel {}", parcel_id),
            current: fresh.status.to_string(),
        })
    }

    /// Idempotent repair for a flagged assignment gap: re-applies the
    /// target account's `work_status` from the parcel's persisted state.
    /// Returns `true` when a write was applied.
    pub async fn repair_assignment(
        &self,
        principal: &str,
        parcel_id: &str,
    ) -> WorkflowResult<bool> {
        self.authorize(principal, Role::Hr).await?;

        let parcel = self
            .parcels
            .find_by_id(parcel_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Parcel {}", parcel_id)))?;

        if !matches!(
            parcel.status,
            ParcelStatus::Assigned | ParcelStatus::EmployeeArriving
        ) {
            return Ok(false);
        }

        Ok(self
            .accounts
            .set_work_status(&parcel.target_employee_email, WorkStatus::InDelivery)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_closed() {
        use ParcelStatus::*;
        assert!(transition_allowed(Pending, Rejected));
        assert!(transition_allowed(Assigned, EmployeeArriving));
        assert!(transition_allowed(Assigned, Completed));
        assert!(transition_allowed(EmployeeArriving, Completed));

        // No shortcuts into assignment, no resurrection of terminals
        assert!(!transition_allowed(Pending, Assigned));
        assert!(!transition_allowed(Pending, Completed));
        assert!(!transition_allowed(Rejected, Pending));
        assert!(!transition_allowed(Completed, Assigned));
        assert!(!transition_allowed(Completed, EmployeeArriving));
        assert!(!transition_allowed(EmployeeArriving, Assigned));
    }
}
