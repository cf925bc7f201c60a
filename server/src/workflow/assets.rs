//! Asset request state machine
//!
//! Transition table: `pending -> { approved -> returned | rejected }`.
//!
//! Approval is the contended path: the stock decrement is the
//! serialization point (`available_quantity > 0` CAS), applied before the
//! request CAS and compensated with an increment if the request turns out
//! to have left `pending` concurrently. Two approvals of the last unit can
//! therefore never both commit.

use shared::types::{AssetRequestStatus, Role};
use tracing::{error, warn};

use super::{TransitionOutcome, Workflow, WorkflowError, WorkflowResult};
use crate::db::models::AssetRequest;

impl Workflow {
    /// Approve a pending asset request, consuming one unit of stock.
    /// Stamps `approval_date` and `processed_by` with the status change.
    pub async fn approve_asset_request(
        &self,
        principal: &str,
        request_id: &str,
    ) -> WorkflowResult<AssetRequest> {
        self.authorize(principal, Role::Admin).await?;

        let request = self
            .asset_requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Asset request {}", request_id)))?;
        if request.request_status != AssetRequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                entity: format!("asset request {}", request_id),
                current: request.request_status.to_string(),
            });
        }

        let asset_id = request.asset_id.to_string();

        // Take the unit first; this is what concurrent approvals race on
        if self.assets.try_decrement(&asset_id).await?.is_none() {
            return Err(WorkflowError::OutOfStock(format!(
                "Asset {} has no available quantity",
                asset_id
            )));
        }

        let transitioned = self
            .transition_with_retry(
                request_id,
                AssetRequestStatus::Pending,
                AssetRequestStatus::Approved,
                Some(principal),
            )
            .await?;

        match transitioned {
            Some(request) => Ok(request),
            None => {
                // The request left `pending` under us: give the unit back
                if let Err(e) = self.assets.increment(&asset_id).await {
                    error!(
                        target: "workflow",
                        request_id,
                        asset_id,
                        error = %e,
                        "failed to compensate stock after lost approval race"
                    );
                }
                let current = self
                    .asset_requests
                    .find_by_id(request_id)
                    .await?
                    .map(|r| r.request_status.to_string())
                    .unwrap_or_else(|| "missing".to_string());
                Err(WorkflowError::InvalidTransition {
                    entity: format!("asset request {}", request_id),
                    current,
                })
            }
        }
    }

    /// Reject a pending asset request (stock untouched)
    pub async fn reject_asset_request(
        &self,
        principal: &str,
        request_id: &str,
    ) -> WorkflowResult<AssetRequest> {
        self.authorize(principal, Role::Admin).await?;

        let transitioned = self
            .transition_with_retry(
                request_id,
                AssetRequestStatus::Pending,
                AssetRequestStatus::Rejected,
                Some(principal),
            )
            .await?;

        match transitioned {
            Some(request) => Ok(request),
            None => {
                let current = self
                    .asset_requests
                    .find_by_id(request_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::NotFound(format!("Asset request {}", request_id))
                    })?;
                Err(WorkflowError::InvalidTransition {
                    entity: format!("asset request {}", request_id),
                    current: current.request_status.to_string(),
                })
            }
        }
    }

    /// Return an approved asset: `approved -> returned`, restocking one
    /// unit. The restock is a secondary write; a failure flags the outcome
    /// rather than undoing the return.
    pub async fn return_asset_request(
        &self,
        principal: &str,
        request_id: &str,
    ) -> WorkflowResult<TransitionOutcome<AssetRequest>> {
        self.authorize(principal, Role::Admin).await?;

        let transitioned = self
            .transition_with_retry(
                request_id,
                AssetRequestStatus::Approved,
                AssetRequestStatus::Returned,
                None,
            )
            .await?;

        let request = match transitioned {
            Some(request) => request,
            None => {
                let current = self
                    .asset_requests
                    .find_by_id(request_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::NotFound(format!("Asset request {}", request_id))
                    })?;
                return Err(WorkflowError::InvalidTransition {
                    entity: format!("asset request {}", request_id),
                    current: current.request_status.to_string(),
                });
            }
        };

        let asset_id = request.asset_id.to_string();
        match self.assets.increment(&asset_id).await {
            Ok(_) => Ok(TransitionOutcome::clean(request)),
            Err(e) => {
                let gap = format!(
                    "asset request {} returned but restock of {} failed: {}",
                    request_id, asset_id, e
                );
                warn!(target: "workflow", request_id, asset_id, error = %e, "{}", gap);
                Ok(TransitionOutcome::flagged(request, gap))
            }
        }
    }

    /// One CAS attempt plus a single retry after a fresh read (a miss with
    /// the source state still in place is treated as transient).
    async fn transition_with_retry(
        &self,
        request_id: &str,
        from: AssetRequestStatus,
        to: AssetRequestStatus,
        processed_by: Option<&str>,
    ) -> WorkflowResult<Option<AssetRequest>> {
        if let Some(request) = self
            .asset_requests
            .transition(request_id, from, to, processed_by)
            .await?
        {
            return Ok(Some(request));
        }

        let fresh = self.asset_requests.find_by_id(request_id).await?;
        match fresh {
            Some(request) if request.request_status == from => Ok(self
                .asset_requests
                .transition(request_id, from, to, processed_by)
                .await?),
            _ => Ok(None),
        }
    }
}
