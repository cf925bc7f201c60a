//! Server configuration
//!
//! All settings come from environment variables with sensible defaults:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/assetverse | database + log files |
//! | HTTP_PORT | 3000 | API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | CHECKOUT_SECRET | (empty) | provider API key |
//! | CHECKOUT_API_BASE | https://api.stripe.com | provider base URL |
//! | SITE_DOMAIN | http://localhost:5173 | checkout redirect base |
//! | PROVIDER_TIMEOUT_MS | 10000 | bound on provider calls |
//! | JWT_SECRET / JWT_* | see `auth::jwt` | token verification |

use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::payments::CheckoutConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// JWT verification configuration
    pub jwt: JwtConfig,
    /// Checkout provider configuration
    pub checkout: CheckoutConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let site_domain =
            std::env::var("SITE_DOMAIN").unwrap_or_else(|_| "http://localhost:5173".into());

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/assetverse".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::default(),
            checkout: CheckoutConfig {
                secret_key: std::env::var("CHECKOUT_SECRET").unwrap_or_default(),
                api_base: std::env::var("CHECKOUT_API_BASE")
                    .unwrap_or_else(|_| "https://api.stripe.com".into()),
                success_url: format!("{site_domain}/hr-manager/upgrade-package-success"),
                cancel_url: format!("{site_domain}/hr-manager/upgrade-package"),
                timeout_ms: std::env::var("PROVIDER_TIMEOUT_MS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(10_000),
            },
        }
    }

    /// Override work dir and port (test scenarios)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Directory holding the embedded database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory holding rotated log files
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Ensure the work directory structure exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}
