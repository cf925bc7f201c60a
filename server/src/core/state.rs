//! Server state
//!
//! Shared handles for all request handlers. The store handle is threaded
//! through here explicitly; there is no process-wide connection
//! singleton.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::payments::{CheckoutProvider, StripeCheckout};
use crate::utils::AppError;
use crate::workflow::Workflow;

/// Shared server state, cheap to clone (Arc fields)
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    /// JWT verification service
    pub jwt_service: Arc<JwtService>,
    /// The workflow engine (state machine + ledger + orchestration)
    pub workflow: Arc<Workflow>,
}

impl ServerState {
    /// Initialize state for production: on-disk database, HTTP checkout
    /// provider built from config.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_service = DbService::new(&config.database_dir().join("assetverse.db")).await?;
        let provider = Arc::new(
            StripeCheckout::new(config.checkout.clone())
                .map_err(|e| AppError::internal(format!("Failed to build checkout client: {e}")))?,
        );

        Ok(Self::with_parts(config.clone(), db_service.db, provider))
    }

    /// Build state from explicit parts (tests inject an in-memory database
    /// and a mock provider here)
    pub fn with_parts(
        config: Config,
        db: Surreal<Db>,
        provider: Arc<dyn CheckoutProvider>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let workflow = Arc::new(Workflow::new(db.clone(), provider));

        Self {
            config,
            db,
            jwt_service,
            workflow,
        }
    }
}
