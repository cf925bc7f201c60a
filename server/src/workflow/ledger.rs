//! Entitlement Ledger
//!
//! Converts externally confirmed payments into durable entitlement state,
//! exactly once. The unique index on `payment_record.transaction_id` is
//! the only serialization point: a duplicate callback (or a concurrent
//! one) loses the insert race and is answered with the winner's record.

use chrono::Utc;
use shared::request::CheckoutSessionCreate;
use shared::types::Role;
use tracing::{info, warn};
use validator::Validate;

use super::{Workflow, WorkflowError, WorkflowResult};
use crate::db::models::PaymentRecord;
use crate::db::repository::{NewPayment, RepoError};
use crate::payments::provider::{META_EMPLOYEE_LIMIT, META_PACKAGE_NAME};
use crate::payments::{CheckoutSession, CreatedSession, NewSession};

/// Result of a reconciliation.
///
/// `already_applied` marks an idempotent re-application (success, not an
/// error); `consistency_gap` marks a created record whose entitlement
/// write did not land. The record itself remains the source of truth for
/// `repair_entitlements`.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub record: PaymentRecord,
    pub already_applied: bool,
    pub consistency_gap: Option<String>,
}

impl Workflow {
    /// Start a checkout session with the provider for the HR principal
    pub async fn create_checkout_session(
        &self,
        principal: &str,
        payload: CheckoutSessionCreate,
    ) -> WorkflowResult<CreatedSession> {
        payload
            .validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;
        self.authorize(principal, Role::Hr).await?;

        Ok(self
            .provider
            .create_session(NewSession {
                package_name: payload.package_name,
                price: payload.price,
                employee_limit: payload.employee_limit,
                customer_email: principal.to_string(),
            })
            .await?)
    }

    /// Reconcile a provider callback into entitlement state, exactly once.
    ///
    /// Safe under at-least-once callback delivery: re-reconciling a known
    /// transaction returns the existing record without touching the
    /// account again.
    pub async fn reconcile_payment(&self, session_id: &str) -> WorkflowResult<PaymentOutcome> {
        let session = self.provider.retrieve_session(session_id).await?;

        if session.payment_status != "paid" {
            return Err(WorkflowError::PaymentNotCompleted(format!(
                "Session {} reports payment_status '{}'",
                session_id, session.payment_status
            )));
        }

        let grant = EntitlementGrant::from_session(&session)?;

        // Fast path: already reconciled
        if let Some(existing) = self
            .payments
            .find_by_transaction_id(&grant.transaction_id)
            .await?
        {
            return Ok(PaymentOutcome {
                record: existing,
                already_applied: true,
                consistency_gap: None,
            });
        }

        let record = match self
            .payments
            .insert(NewPayment {
                transaction_id: grant.transaction_id.clone(),
                hr_email: grant.hr_email.clone(),
                package_name: grant.package_name.clone(),
                employee_limit: grant.employee_limit,
                amount: grant.amount,
                payment_date: Utc::now(),
            })
            .await
        {
            Ok(record) => record,
            // Lost the insert race to a concurrent duplicate callback:
            // already applied, answer with the winner's record
            Err(RepoError::Duplicate(_)) => {
                let existing = self
                    .payments
                    .find_by_transaction_id(&grant.transaction_id)
                    .await?
                    .ok_or_else(|| {
                        WorkflowError::UpstreamUnavailable(format!(
                            "Payment record for {} vanished after duplicate insert",
                            grant.transaction_id
                        ))
                    })?;
                return Ok(PaymentOutcome {
                    record: existing,
                    already_applied: true,
                    consistency_gap: None,
                });
            }
            Err(e) => return Err(e.into()),
        };

        match self
            .accounts
            .apply_entitlements(&grant.hr_email, &grant.package_name, grant.employee_limit)
            .await
        {
            Ok(true) => {
                info!(
                    target: "workflow",
                    transaction_id = %grant.transaction_id,
                    hr_email = %grant.hr_email,
                    package = %grant.package_name,
                    employee_limit = grant.employee_limit,
                    "payment reconciled"
                );
                Ok(PaymentOutcome {
                    record,
                    already_applied: false,
                    consistency_gap: None,
                })
            }
            Ok(false) => {
                let gap = format!(
                    "payment {} recorded but account {} not found for entitlement update",
                    grant.transaction_id, grant.hr_email
                );
                warn!(target: "workflow", transaction_id = %grant.transaction_id, "{}", gap);
                Ok(PaymentOutcome {
                    record,
                    already_applied: false,
                    consistency_gap: Some(gap),
                })
            }
            Err(e) => {
                let gap = format!(
                    "payment {} recorded but entitlement update failed: {}",
                    grant.transaction_id, e
                );
                warn!(target: "workflow", transaction_id = %grant.transaction_id, error = %e, "{}", gap);
                Ok(PaymentOutcome {
                    record,
                    already_applied: false,
                    consistency_gap: Some(gap),
                })
            }
        }
    }

    /// Re-apply entitlements from a persisted payment record (repair for a
    /// flagged reconciliation gap). Idempotent: applying an entitlement
    /// that already holds is a no-op on the account's observable state.
    pub async fn repair_entitlements(
        &self,
        principal: &str,
        transaction_id: &str,
    ) -> WorkflowResult<bool> {
        self.authorize(principal, Role::Admin).await?;

        let record = self
            .payments
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| {
                WorkflowError::NotFound(format!("Payment record {}", transaction_id))
            })?;

        Ok(self
            .accounts
            .apply_entitlements(&record.hr_email, &record.package_name, record.employee_limit)
            .await?)
    }

    /// Payment history for the HR principal, newest first. Admins may
    /// query another account's history.
    pub async fn list_payments(
        &self,
        principal: &str,
        email: Option<&str>,
    ) -> WorkflowResult<Vec<PaymentRecord>> {
        let resolved = self.authorize(principal, Role::Hr).await?;

        let email = match email {
            Some(other) if other != principal => {
                if !resolved.meets(Role::Admin) {
                    return Err(WorkflowError::Forbidden(
                        "Only admins may list another account's payments".to_string(),
                    ));
                }
                other
            }
            _ => principal,
        };

        Ok(self.payments.list_by_email(email).await?)
    }
}

/// The entitlement data a paid session must carry
struct EntitlementGrant {
    transaction_id: String,
    hr_email: String,
    package_name: String,
    employee_limit: i64,
    amount: i64,
}

impl EntitlementGrant {
    fn from_session(session: &CheckoutSession) -> WorkflowResult<Self> {
        let transaction_id = session
            .payment_intent
            .clone()
            .ok_or_else(|| {
                WorkflowError::Validation(format!(
                    "Paid session {} carries no settlement identifier",
                    session.id
                ))
            })?;
        let hr_email = session.customer_email.clone().ok_or_else(|| {
            WorkflowError::Validation(format!("Session {} carries no customer email", session.id))
        })?;
        let package_name = session
            .metadata
            .get(META_PACKAGE_NAME)
            .cloned()
            .ok_or_else(|| {
                WorkflowError::Validation(format!(
                    "Session {} metadata missing {}",
                    session.id, META_PACKAGE_NAME
                ))
            })?;
        let employee_limit = session
            .metadata
            .get(META_EMPLOYEE_LIMIT)
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| {
                WorkflowError::Validation(format!(
                    "Session {} metadata missing or non-numeric {}",
                    session.id, META_EMPLOYEE_LIMIT
                ))
            })?;
        // The record is immutable audit state, so a session without an
        // amount is rejected rather than recorded as zero
        let amount = session.amount_total.ok_or_else(|| {
            WorkflowError::Validation(format!("Session {} carries no amount", session.id))
        })?;

        Ok(Self {
            transaction_id,
            hr_email,
            package_name,
            employee_limit,
            amount,
        })
    }
}
