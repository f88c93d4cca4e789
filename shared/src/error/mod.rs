//! Error codes, the API error type and the response envelope
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::CartItemExists).with_detail("product_id", "dev-42");
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(4001));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
