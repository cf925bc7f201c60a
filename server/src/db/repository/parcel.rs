//! Parcel Request Repository

use chrono::Utc;
use shared::types::ParcelStatus;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::ParcelRequest;

/// Listing filter for parcel requests
#[derive(Debug, Clone, Default)]
pub struct ParcelFilter {
    pub hr_email: Option<String>,
    pub assignee_email: Option<String>,
    pub statuses: Option<Vec<ParcelStatus>>,
}

#[derive(Clone)]
pub struct ParcelRepository {
    base: BaseRepository,
}

impl ParcelRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a pending parcel request
    pub async fn create(
        &self,
        hr_email: &str,
        target_employee_email: &str,
    ) -> RepoResult<ParcelRequest> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE parcel_request SET
                    hr_email = $hr_email,
                    target_employee_email = $target,
                    status = 'pending',
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("hr_email", hr_email.to_string()))
            .bind(("target", target_employee_email.to_string()))
            .bind(("created_at", Utc::now()))
            .await?;
        let created: Option<ParcelRequest> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create parcel request".to_string()))
    }

    /// Find by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ParcelRequest>> {
        let thing = self.base.parse_id(id)?;
        let parcel: Option<ParcelRequest> = self.base.db().select(thing).await?;
        Ok(parcel)
    }

    /// List parcels by owner/assignee/status set, newest first
    pub async fn list(&self, filter: ParcelFilter) -> RepoResult<Vec<ParcelRequest>> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.hr_email.is_some() {
            clauses.push("hr_email = $hr_email");
        }
        if filter.assignee_email.is_some() {
            clauses.push("target_employee_email = $assignee");
        }
        if filter.statuses.is_some() {
            clauses.push("status IN $statuses");
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT * FROM parcel_request{} ORDER BY created_at DESC",
            where_clause
        );

        let mut query = self.base.db().query(sql);
        if let Some(hr_email) = filter.hr_email {
            query = query.bind(("hr_email", hr_email));
        }
        if let Some(assignee) = filter.assignee_email {
            query = query.bind(("assignee", assignee));
        }
        if let Some(statuses) = filter.statuses {
            query = query.bind(("statuses", statuses));
        }

        let parcels: Vec<ParcelRequest> = query.await?.take(0)?;
        Ok(parcels)
    }

    /// Assigned-assets view for an HR owner, ordered by approval date
    /// descending (feeds the printable listing).
    pub async fn list_assigned(&self, hr_email: &str) -> RepoResult<Vec<ParcelRequest>> {
        let parcels: Vec<ParcelRequest> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM parcel_request
                WHERE hr_email = $hr_email
                    AND status IN ['assigned', 'employee_arriving', 'completed']
                ORDER BY approval_date DESC"#,
            )
            .bind(("hr_email", hr_email.to_string()))
            .await?
            .take(0)?;
        Ok(parcels)
    }

    /// `pending -> assigned` compare-and-swap. Sets `assigned_user_id` and
    /// `approval_date` in the same write so the assignee/status invariant
    /// never has an observable half-applied state. Returns `None` when the
    /// parcel was not `pending`.
    pub async fn assign(
        &self,
        id: &str,
        assigned_user_id: RecordId,
    ) -> RepoResult<Option<ParcelRequest>> {
        let thing = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'assigned',
                    assigned_user_id = $assigned,
                    approval_date = $approval_date
                WHERE status = 'pending'
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("assigned", assigned_user_id))
            .bind(("approval_date", Utc::now()))
            .await?;
        Ok(result.take::<Option<ParcelRequest>>(0)?)
    }

    /// Generic status compare-and-swap: `from -> to`, touching nothing
    /// else. Returns `None` on a stale source state.
    pub async fn transition(
        &self,
        id: &str,
        from: ParcelStatus,
        to: ParcelStatus,
    ) -> RepoResult<Option<ParcelRequest>> {
        let thing = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $to WHERE status = $from RETURN AFTER")
            .bind(("thing", thing))
            .bind(("to", to))
            .bind(("from", from))
            .await?;
        Ok(result.take::<Option<ParcelRequest>>(0)?)
    }

    /// Hard delete (admin maintenance; lifecycle records that entered the
    /// workflow are normally kept as audit trail)
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = self.base.parse_id(id)?;
        let deleted: Option<ParcelRequest> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
