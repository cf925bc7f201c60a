//! Database models
//!
//! Serde models matching the SurrealDB tables. Lifecycle enums live in the
//! `shared` crate so clients see the same closed sets.

pub mod account;
pub mod asset;
pub mod asset_request;
pub mod parcel;
pub mod payment;
pub mod serde_helpers;

pub use account::Account;
pub use asset::Asset;
pub use asset_request::AssetRequest;
pub use parcel::ParcelRequest;
pub use payment::PaymentRecord;
