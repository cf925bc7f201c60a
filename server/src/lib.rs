//! AssetVerse Server - organizational asset and parcel management backend
//!
//! # Architecture
//!
//! - **API** (`api`): RESTful routes and handlers
//! - **Authentication** (`auth`): JWT verification, role resolution
//! - **Workflow** (`workflow`): state machine, entitlement ledger,
//!   orchestration; the single authorization point
//! - **Database** (`db`): embedded SurrealDB storage, conditional writes
//! - **Payments** (`payments`): hosted checkout provider boundary
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/          # configuration, state, server runner
//! ├── auth/          # JWT, role resolver, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── workflow/      # transitions, ledger, orchestration
//! ├── payments/      # checkout provider contract + clients
//! ├── db/            # models and repositories
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod payments;
pub mod utils;
pub mod workflow;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult};
pub use workflow::Workflow;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, create the work directory layout and initialize logging.
/// Called once at startup, before anything touches the config.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    if config.environment == "production" {
        init_logger_with_file(Some("info"), log_dir.to_str());
    } else {
        init_logger();
    }

    Ok(())
}
