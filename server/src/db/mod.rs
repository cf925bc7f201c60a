//! Database Module
//!
//! Embedded SurrealDB storage. The store is the only synchronization point
//! in the system: state-changing writes are conditional updates and the
//! unique indexes defined here are what makes payment reconciliation
//! idempotent.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "assetverse";
const DATABASE: &str = "assetverse";

/// Schema bootstrap, applied on every open (idempotent).
///
/// `payment_txn_unique` is load-bearing: a violation on insert is how a
/// duplicate payment callback is detected (see `workflow::ledger`).
const SCHEMA: &str = r#"
DEFINE INDEX IF NOT EXISTS account_email_unique ON TABLE account COLUMNS email UNIQUE;
DEFINE INDEX IF NOT EXISTS payment_txn_unique ON TABLE payment_record COLUMNS transaction_id UNIQUE;
"#;

/// Database service, owner of the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `path`
    pub async fn new(path: &Path) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        let service = Self { db };
        service.initialize().await?;
        tracing::info!("Database opened at {}", path.display());
        Ok(service)
    }

    /// Open an in-memory database (tests)
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        let service = Self { db };
        service.initialize().await?;
        Ok(service)
    }

    async fn initialize(&self) -> Result<(), AppError> {
        self.db
            .use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
        self.db
            .query(SCHEMA)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::AccountRepository;

    #[tokio::test]
    async fn on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("assetverse.db");

        {
            let db = DbService::new(&path).await.expect("open db");
            AccountRepository::new(db.db)
                .find_or_create("hr@example.com")
                .await
                .expect("create account");
        }

        let db = DbService::new(&path).await.expect("reopen db");
        let account = AccountRepository::new(db.db)
            .find_by_email("hr@example.com")
            .await
            .expect("lookup")
            .expect("account persisted");
        assert_eq!(account.email, "hr@example.com");
    }
}
