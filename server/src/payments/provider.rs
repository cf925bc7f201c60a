//! Checkout provider contract and HTTP implementation

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata keys the provider round-trips on a session. The reconciliation
/// step reads the package grant back out of these.
pub const META_PACKAGE_NAME: &str = "packageName";
pub const META_EMPLOYEE_LIMIT: &str = "employeeLimit";

/// Checkout provider configuration
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Provider API secret key
    pub secret_key: String,
    /// Provider API base URL (overridable for tests)
    pub api_base: String,
    /// Redirect after a successful checkout
    pub success_url: String,
    /// Redirect after an abandoned checkout
    pub cancel_url: String,
    /// Upper bound for any single provider call
    pub timeout_ms: u64,
}

/// Provider boundary errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider call timed out: {0}")]
    Timeout(String),

    #[error("Provider transport error: {0}")]
    Transport(String),

    #[error("Checkout session not found: {0}")]
    SessionNotFound(String),

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Parameters for a new checkout session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub package_name: String,
    /// Price in minor currency units
    pub price: i64,
    pub employee_limit: u32,
    pub customer_email: String,
}

/// A created session, ready for client redirect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: String,
    pub url: String,
}

/// A retrieved session, as reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// "paid" once the customer completed checkout
    pub payment_status: String,
    /// Settlement identifier; the ledger derives `transaction_id` from it
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
}

/// Hosted checkout provider contract
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(&self, params: NewSession) -> Result<CreatedSession, ProviderError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, ProviderError>;
}

/// Stripe-style HTTP checkout client
pub struct StripeCheckout {
    client: reqwest::Client,
    config: CheckoutConfig,
}

impl StripeCheckout {
    pub fn new(config: CheckoutConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn map_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(&self, params: NewSession) -> Result<CreatedSession, ProviderError> {
        let price = params.price.to_string();
        let limit = params.employee_limit.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("line_items[0][price_data][currency]", "usd"),
            ("line_items[0][price_data][unit_amount]", &price),
            (
                "line_items[0][price_data][product_data][name]",
                &params.package_name,
            ),
            ("line_items[0][quantity]", "1"),
            ("customer_email", &params.customer_email),
            ("metadata[packageName]", &params.package_name),
            ("metadata[employeeLimit]", &limit),
            ("success_url", &self.config.success_url),
            ("cancel_url", &self.config.cancel_url),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .basic_auth(&self.config.secret_key, Option::<&str>::None)
            .form(&form)
            .send()
            .await
            .map_err(Self::map_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transport(format!(
                "Create session failed ({}): {}",
                status, body
            )));
        }

        response
            .json::<CreatedSession>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, ProviderError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.config.api_base, session_id
            ))
            .basic_auth(&self.config.secret_key, Option::<&str>::None)
            .send()
            .await
            .map_err(Self::map_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::SessionNotFound(session_id.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transport(format!(
                "Retrieve session failed ({}): {}",
                status, body
            )));
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}
