//! Identity & Role Resolver
//!
//! Resolves an authenticated principal's role and work status from the
//! account store. Read-only: the resolver never mutates accounts.

use shared::types::{Role, WorkStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{AccountRepository, RepoResult};

/// Resolution result for a principal email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub role: Role,
    pub work_status: WorkStatus,
}

impl Resolved {
    /// True when this principal meets or exceeds `required` in the role
    /// ordering `user < employee < hr < admin`
    pub fn meets(&self, required: Role) -> bool {
        self.role >= required
    }
}

#[derive(Clone)]
pub struct RoleResolver {
    accounts: AccountRepository,
}

impl RoleResolver {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            accounts: AccountRepository::new(db),
        }
    }

    /// Resolve role and work status for an email. Unknown emails resolve
    /// to the default `user`/`available`; only store failures error.
    pub async fn resolve(&self, email: &str) -> RepoResult<Resolved> {
        let account = self.accounts.find_by_email(email).await?;
        Ok(match account {
            Some(account) => Resolved {
                role: account.role,
                work_status: account.work_status,
            },
            None => Resolved {
                role: Role::default(),
                work_status: WorkStatus::default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn unknown_email_resolves_to_user() {
        let db = DbService::memory().await.expect("open memory db");
        let resolver = RoleResolver::new(db.db.clone());

        let resolved = resolver
            .resolve("nobody@example.com")
            .await
            .expect("resolve must not fail for unknown emails");
        assert_eq!(resolved.role, Role::User);
        assert_eq!(resolved.work_status, WorkStatus::Available);
    }

    #[tokio::test]
    async fn resolves_stored_role() {
        let db = DbService::memory().await.expect("open memory db");
        let accounts = AccountRepository::new(db.db.clone());
        let account = accounts
            .find_or_create("admin@example.com")
            .await
            .expect("create account");
        let id = account.id.expect("created account has id").to_string();
        accounts
            .update_role(&id, Role::Admin)
            .await
            .expect("grant admin");

        let resolver = RoleResolver::new(db.db.clone());
        let resolved = resolver
            .resolve("admin@example.com")
            .await
            .expect("resolve");
        assert_eq!(resolved.role, Role::Admin);
        assert!(resolved.meets(Role::Hr));
    }

    #[test]
    fn meets_follows_role_ordering() {
        let hr = Resolved {
            role: Role::Hr,
            work_status: WorkStatus::Available,
        };
        assert!(hr.meets(Role::User));
        assert!(hr.meets(Role::Employee));
        assert!(hr.meets(Role::Hr));
        assert!(!hr.meets(Role::Admin));
    }
}
