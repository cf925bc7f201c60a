//! Authentication & Role Resolution
//!
//! Bearer-token verification (the external identity service's boundary in
//! this process) and the read-only role resolver backed by the account
//! store.

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod resolver;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use resolver::{Resolved, RoleResolver};
