//! Device storefront core
//!
//! Catalog browsing with URL-synchronized filters, a per-user cart mirror
//! with conflict classification, and the audit trail behind cart changes.

pub mod api;
pub mod audit;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod logger;
pub mod reports;
pub mod state;

pub use config::{CatalogConfig, Config};
pub use state::AppState;
