//! HTTP API

pub mod cart;
pub mod catalog;
pub mod health;
pub mod reports;
pub mod session;

use axum::Router;
use axum::routing::{delete, get};
use shared::error::{ApiResponse, AppError};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

pub fn create_router(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/api/catalog", get(catalog::browse_all))
        .route("/api/catalog/{slug}", get(catalog::browse))
        .route("/api/facets", get(catalog::entry_facets));

    let cart = Router::new()
        .route(
            "/api/cart",
            get(cart::list).post(cart::add).delete(cart::clear),
        )
        .route("/api/cart/{product_id}", delete(cart::remove));

    let reports = Router::new().route("/api/reports/wins", get(reports::wins));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(catalog)
        .merge(cart)
        .merge(reports)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
