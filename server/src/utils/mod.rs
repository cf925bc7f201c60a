//! Utilities
//!
//! Application-wide error type, response helpers and logging setup.

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult, ok, ok_with_warning};
pub use shared::response::ApiResponse;
