use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            Success => StatusCode::OK,
            NotAuthenticated => StatusCode::UNAUTHORIZED,
            PermissionDenied | DataEntryRoleRequired => StatusCode::FORBIDDEN,
            CartItemExists | CartProductMissing => StatusCode::CONFLICT,
            // The hosted store failed the read path
            CatalogQueryFailed | ReportQueryFailed => StatusCode::BAD_GATEWAY,
            Unknown | InternalError | DatabaseError | CartUpdateFailed | CartLoadFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ValidationFailed | InvalidRequest | CustomValueRequired | CartInvalidQuantity => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}
