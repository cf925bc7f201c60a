//! Asset Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Asset;

#[derive(Clone)]
pub struct AssetRepository {
    base: BaseRepository,
}

impl AssetRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Register an asset in the catalog
    pub async fn create(&self, name: &str, available_quantity: i64) -> RepoResult<Asset> {
        if available_quantity < 0 {
            return Err(RepoError::Validation(
                "available_quantity must be non-negative".to_string(),
            ));
        }
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE asset SET
                    name = $name,
                    available_quantity = $quantity
                RETURN AFTER"#,
            )
            .bind(("name", name.to_string()))
            .bind(("quantity", available_quantity))
            .await?;
        let created: Option<Asset> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create asset".to_string()))
    }

    /// Find by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Asset>> {
        let thing = self.base.parse_id(id)?;
        let asset: Option<Asset> = self.base.db().select(thing).await?;
        Ok(asset)
    }

    /// List the catalog
    pub async fn find_all(&self) -> RepoResult<Vec<Asset>> {
        let assets: Vec<Asset> = self
            .base
            .db()
            .query("SELECT * FROM asset ORDER BY name")
            .await?
            .take(0)?;
        Ok(assets)
    }

    /// Conditional stock decrement: only applies where
    /// `available_quantity > 0`, so two concurrent approvals of the last
    /// unit cannot both succeed. Returns `None` when the stock was empty.
    pub async fn try_decrement(&self, id: &str) -> RepoResult<Option<Asset>> {
        let thing = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET available_quantity -= 1
                WHERE available_quantity > 0
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .await?;
        Ok(result.take::<Option<Asset>>(0)?)
    }

    /// Restock by one (asset return, or compensation after a failed
    /// approval compare-and-swap)
    pub async fn increment(&self, id: &str) -> RepoResult<Asset> {
        let thing = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET available_quantity += 1 RETURN AFTER")
            .bind(("thing", thing))
            .await?;
        result
            .take::<Option<Asset>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Asset {} not found", id)))
    }
}
