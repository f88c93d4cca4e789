use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// The error returned by every API handler
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Context such as the conflicting product id
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Response envelope
///
/// `code` is 0 on success; on failure it carries the [`ErrorCode`] and
/// `details` may name what conflicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: ErrorCode::Success.message().to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// HTTP status matching `code`; unknown codes are a server error
    pub fn status(&self) -> StatusCode {
        match self.code {
            None | Some(0) => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(err: &AppError) -> Self {
        err.clone().into()
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error");
        }
        ApiResponse::<()>::from(self).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (self.status(), axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_error_envelope() {
        let err = AppError::new(ErrorCode::CartItemExists).with_detail("product_id", "dev-7");
        assert_eq!(err.to_string(), "This device is already in your cart");
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let response = ApiResponse::<()>::error(&err);
        assert_eq!(response.code, Some(4001));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.details.as_ref().unwrap()["product_id"], "dev-7");
    }

    #[test]
    fn test_success_envelope_serialization() {
        let response = ApiResponse::success(vec!["dev-1"]);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "code": 0, "message": "OK", "data": ["dev-1"] })
        );
    }

    #[test]
    fn test_unknown_code_status() {
        let response: ApiResponse<()> = ApiResponse {
            code: Some(6543),
            message: "?".into(),
            data: None,
            details: None,
        };
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_custom_message() {
        let err = AppError::internal("pool exhausted");
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "pool exhausted");
        assert!(err.details.is_none());
        assert_eq!(AppError::not_authenticated().http_status(), StatusCode::UNAUTHORIZED);
    }
}
