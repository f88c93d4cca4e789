use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("product {0} is already in the cart")]
    AlreadyInCart(String),

    #[error("product {0} no longer exists")]
    ProductMissing(String),

    #[error("invalid quantity {0}")]
    InvalidQuantity(u32),

    #[error("failed to load cart: {0}")]
    Load(#[source] BackendError),

    #[error("failed to update cart: {0}")]
    Update(#[source] BackendError),
}

impl CartError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AlreadyInCart(_) => ErrorCode::CartItemExists,
            Self::ProductMissing(_) => ErrorCode::CartProductMissing,
            Self::InvalidQuantity(_) => ErrorCode::CartInvalidQuantity,
            Self::Load(_) => ErrorCode::CartLoadFailed,
            Self::Update(_) => ErrorCode::CartUpdateFailed,
        }
    }

    /// Copy for the transient notification
    pub fn user_message(&self) -> &'static str {
        self.code().message()
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyInCart(_) | Self::ProductMissing(_))
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let app = AppError::new(err.code());
        match &err {
            CartError::AlreadyInCart(id) | CartError::ProductMissing(id) => {
                app.with_detail("product_id", id.as_str())
            }
            CartError::InvalidQuantity(q) => app.with_detail("quantity", *q),
            CartError::Load(e) | CartError::Update(e) => {
                tracing::error!(error = %e, "Cart backend failure");
                match e.code() {
                    Some(code) => app.with_detail("backend_code", code),
                    None => app,
                }
            }
        }
    }
}
