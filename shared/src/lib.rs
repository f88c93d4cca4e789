//! Shared types for the device storefront
//!
//! Domain models, the legacy field normalizer and the unified error system,
//! shared by the storefront service and its clients.

pub mod error;
pub mod legacy;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use legacy::RawField;
