//! Shared types for the AssetVerse platform
//!
//! Domain enums, request payloads and the API response envelope used by
//! both the server and its clients.

pub mod request;
pub mod response;
pub mod types;

// Re-exports
pub use response::{API_CODE_SUCCESS, ApiResponse};
pub use types::{AssetRequestStatus, ParcelStatus, PaymentStatus, Role, WorkStatus};
