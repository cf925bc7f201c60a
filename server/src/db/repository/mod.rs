//! Repository Module
//!
//! Per-table data access over SurrealDB. There is no in-process locking
//! anywhere in this crate: every state-changing write in these
//! repositories is a conditional `UPDATE … WHERE <expected prior state>
//! RETURN AFTER`, and an empty result means the entity was not in the
//! expected state (a stale/failed transition, never a silent no-op).

pub mod account;
pub mod asset;
pub mod asset_request;
pub mod parcel;
pub mod payment;

pub use account::AccountRepository;
pub use asset::AssetRepository;
pub use asset_request::{AssetRequestFilter, AssetRequestRepository};
pub use parcel::{ParcelFilter, ParcelRepository};
pub use payment::{NewPayment, PaymentRepository};

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        // Unique index violations read "Database index `…` already contains …"
        if message.contains("already contains") {
            RepoError::Duplicate(message)
        } else {
            RepoError::Database(message)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Parse a "table:id" string into a RecordId
    pub fn parse_id(&self, id: &str) -> RepoResult<surrealdb::RecordId> {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
    }
}
