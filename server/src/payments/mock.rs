//! In-memory checkout provider
//!
//! Serves tests and local development without provider credentials.
//! Sessions created through it report "paid" immediately.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::provider::{
    CheckoutProvider, CheckoutSession, CreatedSession, META_EMPLOYEE_LIMIT, META_PACKAGE_NAME,
    NewSession, ProviderError,
};

#[derive(Default)]
pub struct MockProvider {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    counter: AtomicU64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session directly (e.g. an unpaid one)
    pub fn insert_session(&self, session: CheckoutSession) {
        self.sessions
            .lock()
            .expect("mock provider lock")
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl CheckoutProvider for MockProvider {
    async fn create_session(&self, params: NewSession) -> Result<CreatedSession, ProviderError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let id = format!("cs_mock_{n}");
        let session = CheckoutSession {
            id: id.clone(),
            payment_status: "paid".to_string(),
            payment_intent: Some(format!("pi_mock_{n}")),
            customer_email: Some(params.customer_email),
            metadata: HashMap::from([
                (META_PACKAGE_NAME.to_string(), params.package_name),
                (
                    META_EMPLOYEE_LIMIT.to_string(),
                    params.employee_limit.to_string(),
                ),
            ]),
            amount_total: Some(params.price),
        };
        self.insert_session(session);
        Ok(CreatedSession {
            url: format!("https://checkout.example.com/{id}"),
            id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, ProviderError> {
        self.sessions
            .lock()
            .expect("mock provider lock")
            .get(session_id)
            .cloned()
            .ok_or_else(|| ProviderError::SessionNotFound(session_id.to_string()))
    }
}
