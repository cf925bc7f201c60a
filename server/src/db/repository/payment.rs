//! Payment Record Repository
//!
//! Insert-only. The `payment_txn_unique` index defined at database open is
//! the sole serialization point for idempotent reconciliation: concurrent
//! inserts for one transaction cannot both land, and the loser reads the
//! winner's record back.

use chrono::{DateTime, Utc};
use shared::types::PaymentStatus;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::PaymentRecord;

/// Fields of a new payment record (everything but the generated id)
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub transaction_id: String,
    pub hr_email: String,
    pub package_name: String,
    pub employee_limit: i64,
    pub amount: i64,
    pub payment_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a payment record. A duplicate `transaction_id` surfaces as
    /// `RepoError::Duplicate` via the unique index.
    pub async fn insert(&self, payment: NewPayment) -> RepoResult<PaymentRecord> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE payment_record SET
                    transaction_id = $transaction_id,
                    hr_email = $hr_email,
                    package_name = $package_name,
                    employee_limit = $employee_limit,
                    amount = $amount,
                    payment_date = $payment_date,
                    status = $status
                RETURN AFTER"#,
            )
            .bind(("transaction_id", payment.transaction_id))
            .bind(("hr_email", payment.hr_email))
            .bind(("package_name", payment.package_name))
            .bind(("employee_limit", payment.employee_limit))
            .bind(("amount", payment.amount))
            .bind(("payment_date", payment.payment_date))
            .bind(("status", PaymentStatus::Paid))
            .await?;
        let created: Option<PaymentRecord> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create payment record".to_string()))
    }

    /// Find by transaction id
    pub async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> RepoResult<Option<PaymentRecord>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payment_record WHERE transaction_id = $txn LIMIT 1")
            .bind(("txn", transaction_id.to_string()))
            .await?;
        let records: Vec<PaymentRecord> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// Payment history for an HR account, newest first
    pub async fn list_by_email(&self, email: &str) -> RepoResult<Vec<PaymentRecord>> {
        let records: Vec<PaymentRecord> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM payment_record
                WHERE hr_email = $email
                ORDER BY payment_date DESC"#,
            )
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(records)
    }
}
