//! Account Repository

use chrono::Utc;
use shared::types::{Role, WorkStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Account;

#[derive(Clone)]
pub struct AccountRepository {
    base: BaseRepository,
}

impl AccountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find account by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM account WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let accounts: Vec<Account> = result.take(0)?;
        Ok(accounts.into_iter().next())
    }

    /// Find account by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Account>> {
        let thing = self.base.parse_id(id)?;
        let account: Option<Account> = self.base.db().select(thing).await?;
        Ok(account)
    }

    /// Find or create the account for an email (first sign-in).
    ///
    /// New accounts start as `user`/`available` with no entitlements. A
    /// concurrent first sign-in loses the insert race on the email unique
    /// index and falls back to the winner's record.
    pub async fn find_or_create(&self, email: &str) -> RepoResult<Account> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok(existing);
        }

        let created = self
            .base
            .db()
            .query(
                r#"CREATE account SET
                    email = $email,
                    role = 'user',
                    work_status = 'available',
                    employee_limit = 0,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("email", email.to_string()))
            .bind(("created_at", Utc::now()))
            .await;

        match created {
            Ok(mut result) => {
                let account: Option<Account> = result.take(0)?;
                account.ok_or_else(|| RepoError::Database("Failed to create account".to_string()))
            }
            Err(e) => {
                let repo_err = RepoError::from(e);
                if matches!(repo_err, RepoError::Duplicate(_)) {
                    self.find_by_email(email)
                        .await?
                        .ok_or_else(|| RepoError::NotFound(format!("Account {} not found", email)))
                } else {
                    Err(repo_err)
                }
            }
        }
    }

    /// Grant a role (admin operation, unconditional on current role)
    pub async fn update_role(&self, id: &str, role: Role) -> RepoResult<Account> {
        let thing = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET role = $role RETURN AFTER")
            .bind(("thing", thing))
            .bind(("role", role))
            .await?;
        result
            .take::<Option<Account>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Account {} not found", id)))
    }

    /// One-way `user -> employee` promotion, conditioned on the account
    /// still being a plain user. Sets `work_status = available` in the
    /// same write. Returns `None` when the account was not in `user`.
    pub async fn approve_employee(&self, id: &str) -> RepoResult<Option<Account>> {
        let thing = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    role = 'employee',
                    work_status = 'available'
                WHERE role = 'user'
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .await?;
        Ok(result.take::<Option<Account>>(0)?)
    }

    /// Set the work status of the account with `email`. Returns `false`
    /// when no such account exists so the caller can flag the gap.
    pub async fn set_work_status(&self, email: &str, status: WorkStatus) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("UPDATE account SET work_status = $status WHERE email = $email RETURN AFTER")
            .bind(("status", status))
            .bind(("email", email.to_string()))
            .await?;
        let updated: Vec<Account> = result.take(0)?;
        Ok(!updated.is_empty())
    }

    /// Apply subscription entitlements from a reconciled payment.
    /// Returns `false` when the owning account does not exist.
    pub async fn apply_entitlements(
        &self,
        email: &str,
        package_name: &str,
        employee_limit: i64,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE account SET
                    subscription_package = $package,
                    employee_limit = $limit
                WHERE email = $email
                RETURN AFTER"#,
            )
            .bind(("package", package_name.to_string()))
            .bind(("limit", employee_limit))
            .bind(("email", email.to_string()))
            .await?;
        let updated: Vec<Account> = result.take(0)?;
        Ok(!updated.is_empty())
    }
}
