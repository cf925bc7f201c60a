//! Payment checkout provider boundary
//!
//! The hosted checkout provider is an external collaborator; this module
//! pins down its contract (`CheckoutProvider`) and ships the HTTP-backed
//! implementation plus an in-memory one for tests and offline development.

pub mod mock;
pub mod provider;

pub use mock::MockProvider;
pub use provider::{
    CheckoutConfig, CheckoutProvider, CheckoutSession, CreatedSession, NewSession, ProviderError,
    StripeCheckout,
};
