//! Data models
//!
//! Shared between the storefront service and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod audit;
pub mod cart;
pub mod facet;
pub mod filter;
pub mod manifest;
pub mod product;

// Re-exports
pub use audit::*;
pub use cart::*;
pub use facet::*;
pub use filter::*;
pub use manifest::*;
pub use product::*;
