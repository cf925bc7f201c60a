//! Asset Request Repository

use chrono::Utc;
use shared::types::AssetRequestStatus;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::AssetRequest;

/// Listing filter for asset requests
#[derive(Debug, Clone, Default)]
pub struct AssetRequestFilter {
    pub requester_email: Option<String>,
    pub statuses: Option<Vec<AssetRequestStatus>>,
}

#[derive(Clone)]
pub struct AssetRequestRepository {
    base: BaseRepository,
}

impl AssetRequestRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a pending asset request
    pub async fn create(
        &self,
        requester_email: &str,
        asset_id: RecordId,
    ) -> RepoResult<AssetRequest> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE asset_request SET
                    requester_email = $requester,
                    asset_id = $asset_id,
                    request_status = 'pending',
                    request_date = $request_date
                RETURN AFTER"#,
            )
            .bind(("requester", requester_email.to_string()))
            .bind(("asset_id", asset_id))
            .bind(("request_date", Utc::now()))
            .await?;
        let created: Option<AssetRequest> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create asset request".to_string()))
    }

    /// Find by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<AssetRequest>> {
        let thing = self.base.parse_id(id)?;
        let request: Option<AssetRequest> = self.base.db().select(thing).await?;
        Ok(request)
    }

    /// List requests by requester/status set, newest first
    pub async fn list(&self, filter: AssetRequestFilter) -> RepoResult<Vec<AssetRequest>> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.requester_email.is_some() {
            clauses.push("requester_email = $requester");
        }
        if filter.statuses.is_some() {
            clauses.push("request_status IN $statuses");
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT * FROM asset_request{} ORDER BY request_date DESC",
            where_clause
        );

        let mut query = self.base.db().query(sql);
        if let Some(requester) = filter.requester_email {
            query = query.bind(("requester", requester));
        }
        if let Some(statuses) = filter.statuses {
            query = query.bind(("statuses", statuses));
        }

        let requests: Vec<AssetRequest> = query.await?.take(0)?;
        Ok(requests)
    }

    /// Status compare-and-swap `from -> to`, stamping `approval_date` and
    /// `processed_by` in the same write when leaving `pending`. Returns
    /// `None` on a stale source state.
    pub async fn transition(
        &self,
        id: &str,
        from: AssetRequestStatus,
        to: AssetRequestStatus,
        processed_by: Option<&str>,
    ) -> RepoResult<Option<AssetRequest>> {
        let thing = self.base.parse_id(id)?;
        let mut result = if from == AssetRequestStatus::Pending {
            // Leaving pending stamps the decision fields atomically
            self.base
                .db()
                .query(
                    r#"UPDATE $thing SET
                        request_status = $to,
                        approval_date = $approval_date,
                        processed_by = $processed_by
                    WHERE request_status = $from
                    RETURN AFTER"#,
                )
                .bind(("thing", thing))
                .bind(("to", to))
                .bind(("from", from))
                .bind(("approval_date", Utc::now()))
                .bind(("processed_by", processed_by.map(|s| s.to_string())))
                .await?
        } else {
            self.base
                .db()
                .query(
                    r#"UPDATE $thing SET request_status = $to
                    WHERE request_status = $from
                    RETURN AFTER"#,
                )
                .bind(("thing", thing))
                .bind(("to", to))
                .bind(("from", from))
                .await?
        };
        Ok(result.take::<Option<AssetRequest>>(0)?)
    }
}
