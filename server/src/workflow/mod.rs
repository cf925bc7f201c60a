//! Workflow Engine
//!
//! Composes the role resolver, the request/assignment state machine and
//! the entitlement ledger into the client-facing operations. Every
//! privileged operation authorizes the principal against the account store
//! before touching any entity, and every state change goes through the
//! conditional writes in `db::repository`. The engine holds no locks and
//! no in-memory state of its own.

pub mod error;

mod assets;
mod ledger;
mod parcels;

pub use error::{WorkflowError, WorkflowResult};
pub use ledger::PaymentOutcome;

use std::sync::Arc;

use shared::request::{AssetCreate, AssetRequestCreate, ParcelCreate};
use shared::types::Role;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::auth::{Resolved, RoleResolver};
use crate::db::models::{Account, Asset, AssetRequest, ParcelRequest};
use crate::db::repository::{
    AccountRepository, AssetRepository, AssetRequestFilter, AssetRequestRepository, ParcelFilter,
    ParcelRepository, PaymentRepository, RepoError,
};
use crate::payments::CheckoutProvider;

/// Result of a transition that performs a secondary side-effect write.
///
/// A set `consistency_gap` means the primary transition committed but the
/// secondary write did not: a warning-carrying success that must be
/// repairable later, never a silent drop.
#[derive(Debug, Clone)]
pub struct TransitionOutcome<T> {
    pub entity: T,
    pub consistency_gap: Option<String>,
}

impl<T> TransitionOutcome<T> {
    pub fn clean(entity: T) -> Self {
        Self {
            entity,
            consistency_gap: None,
        }
    }

    pub fn flagged(entity: T, gap: impl Into<String>) -> Self {
        Self {
            entity,
            consistency_gap: Some(gap.into()),
        }
    }
}

/// The workflow engine. One instance per process, shared via `ServerState`
/// (the store handle is threaded through explicitly, no global singleton).
pub struct Workflow {
    pub(crate) accounts: AccountRepository,
    pub(crate) parcels: ParcelRepository,
    pub(crate) assets: AssetRepository,
    pub(crate) asset_requests: AssetRequestRepository,
    pub(crate) payments: PaymentRepository,
    pub(crate) resolver: RoleResolver,
    pub(crate) provider: Arc<dyn CheckoutProvider>,
}

impl Workflow {
    pub fn new(db: Surreal<Db>, provider: Arc<dyn CheckoutProvider>) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            parcels: ParcelRepository::new(db.clone()),
            assets: AssetRepository::new(db.clone()),
            asset_requests: AssetRequestRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            resolver: RoleResolver::new(db),
            provider,
        }
    }

    /// Resolve the principal's role and require `required` or above.
    pub(crate) async fn authorize(
        &self,
        email: &str,
        required: Role,
    ) -> WorkflowResult<Resolved> {
        let resolved = self.resolver.resolve(email).await.map_err(|e| match e {
            RepoError::Database(msg) => WorkflowError::UpstreamUnavailable(msg),
            other => WorkflowError::Storage(other),
        })?;
        if !resolved.meets(required) {
            return Err(WorkflowError::Forbidden(format!(
                "{} requires role {} or above (resolved: {})",
                email, required, resolved.role
            )));
        }
        Ok(resolved)
    }

    /// Role resolution passthrough for the API surface
    pub async fn resolve_role(&self, email: &str) -> WorkflowResult<Resolved> {
        self.resolver.resolve(email).await.map_err(|e| match e {
            RepoError::Database(msg) => WorkflowError::UpstreamUnavailable(msg),
            other => WorkflowError::Storage(other),
        })
    }

    // ========== Creation & listing ==========

    /// Create a pending parcel request owned by the HR principal
    pub async fn create_parcel(
        &self,
        principal: &str,
        payload: ParcelCreate,
    ) -> WorkflowResult<ParcelRequest> {
        payload
            .validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;
        self.authorize(principal, Role::Hr).await?;
        Ok(self
            .parcels
            .create(principal, &payload.target_employee_email)
            .await?)
    }

    /// List parcels, newest first
    pub async fn list_parcels(&self, filter: ParcelFilter) -> WorkflowResult<Vec<ParcelRequest>> {
        Ok(self.parcels.list(filter).await?)
    }

    /// Assigned-assets view for the HR principal (approval date descending)
    pub async fn list_assigned_parcels(
        &self,
        principal: &str,
    ) -> WorkflowResult<Vec<ParcelRequest>> {
        self.authorize(principal, Role::Hr).await?;
        Ok(self.parcels.list_assigned(principal).await?)
    }

    /// Delete a parcel record (admin maintenance)
    pub async fn delete_parcel(&self, principal: &str, parcel_id: &str) -> WorkflowResult<bool> {
        self.authorize(principal, Role::Admin).await?;
        let deleted = self.parcels.delete(parcel_id).await?;
        if !deleted {
            return Err(WorkflowError::NotFound(format!("Parcel {}", parcel_id)));
        }
        Ok(true)
    }

    /// Register an asset in the catalog
    pub async fn create_asset(
        &self,
        principal: &str,
        payload: AssetCreate,
    ) -> WorkflowResult<Asset> {
        payload
            .validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;
        self.authorize(principal, Role::Admin).await?;
        Ok(self
            .assets
            .create(&payload.name, payload.available_quantity)
            .await?)
    }

    /// List the asset catalog
    pub async fn list_assets(&self) -> WorkflowResult<Vec<Asset>> {
        Ok(self.assets.find_all().await?)
    }

    /// Create a pending asset request for the employee principal
    pub async fn create_asset_request(
        &self,
        principal: &str,
        payload: AssetRequestCreate,
    ) -> WorkflowResult<AssetRequest> {
        payload
            .validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;
        self.authorize(principal, Role::Employee).await?;

        let asset = self
            .assets
            .find_by_id(&payload.asset_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Asset {}", payload.asset_id)))?;
        let asset_id = asset
            .id
            .ok_or_else(|| WorkflowError::Validation("Asset record missing id".to_string()))?;

        Ok(self.asset_requests.create(principal, asset_id).await?)
    }

    /// List asset requests. Principals below HR only see their own.
    pub async fn list_asset_requests(
        &self,
        principal: &str,
        mut filter: AssetRequestFilter,
    ) -> WorkflowResult<Vec<AssetRequest>> {
        let resolved = self.authorize(principal, Role::Employee).await?;
        if !resolved.meets(Role::Hr) {
            filter.requester_email = Some(principal.to_string());
        }
        Ok(self.asset_requests.list(filter).await?)
    }

    // ========== Account role transitions ==========

    /// Admin role grant
    pub async fn update_role(
        &self,
        principal: &str,
        account_id: &str,
        role: Role,
    ) -> WorkflowResult<Account> {
        self.authorize(principal, Role::Admin).await?;
        Ok(self.accounts.update_role(account_id, role).await?)
    }

    /// Approve an employee application: one-way `user -> employee`, sets
    /// `work_status = available` in the same write.
    pub async fn approve_employee(
        &self,
        principal: &str,
        account_id: &str,
    ) -> WorkflowResult<Account> {
        self.authorize(principal, Role::Admin).await?;

        if let Some(account) = self.accounts.approve_employee(account_id).await? {
            return Ok(account);
        }

        // CAS missed: report the observed role
        let current = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Account {}", account_id)))?;
        Err(WorkflowError::InvalidTransition {
            entity: format!("account {}", account_id),
            current: current.role.to_string(),
        })
    }
}
