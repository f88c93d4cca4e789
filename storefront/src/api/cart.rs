//! Cart API handlers

use axum::Json;
use axum::extract::{Path, State};
use shared::error::ApiResponse;
use shared::models::{CartAdd, CartLine};

use super::ApiResult;
use super::session::SessionUser;
use crate::state::AppState;

/// GET /api/cart
///
/// Session lookup refreshes the mirror, so the lines are current.
pub async fn list(State(state): State<AppState>, user: SessionUser) -> ApiResult<Vec<CartLine>> {
    let cart = state.carts.get(&user.user_id).await?;
    Ok(ApiResponse::success(cart.lines()))
}

/// POST /api/cart
pub async fn add(
    State(state): State<AppState>,
    user: SessionUser,
    Json(req): Json<CartAdd>,
) -> ApiResult<Vec<CartLine>> {
    let cart = state.carts.get(&user.user_id).await?;
    cart.add(req.product_id.trim(), req.quantity).await?;
    Ok(ApiResponse::success(cart.lines()))
}

/// DELETE /api/cart/{product_id}
pub async fn remove(
    State(state): State<AppState>,
    user: SessionUser,
    Path(product_id): Path<String>,
) -> ApiResult<Vec<CartLine>> {
    let cart = state.carts.get(&user.user_id).await?;
    cart.remove(&product_id).await?;
    Ok(ApiResponse::success(cart.lines()))
}

/// DELETE /api/cart
pub async fn clear(State(state): State<AppState>, user: SessionUser) -> ApiResult<Vec<CartLine>> {
    let cart = state.carts.get(&user.user_id).await?;
    cart.clear().await?;
    Ok(ApiResponse::success(cart.lines()))
}
