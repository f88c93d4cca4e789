//! Catalog API handlers

use std::collections::BTreeSet;

use axum::extract::{Path, RawQuery, State};
use serde::Serialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{FacetCatalog, FilterSelection, Product};

use super::ApiResult;
use super::session::SessionUser;
use crate::catalog::service::ViewError;
use crate::catalog::{CatalogView, EmptyState, FacetContext};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogItem {
    #[serde(flatten)]
    pub product: Product,
    pub in_cart: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub facets: FacetCatalog,
    pub selection: FilterSelection,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ViewError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl CatalogPage {
    fn new(view: CatalogView, in_cart: &BTreeSet<String>) -> Self {
        let items = view
            .products
            .into_iter()
            .map(|product| CatalogItem {
                in_cart: in_cart.contains(&product.id),
                product,
            })
            .collect();
        Self {
            items,
            facets: view.facets,
            selection: view.selection,
            query: view.query,
            error: view.error,
            empty_state: view.empty_state,
            empty_message: view.empty_message,
        }
    }
}

/// GET /api/catalog/{slug}
pub async fn browse(
    State(state): State<AppState>,
    user: Option<SessionUser>,
    Path(slug): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<CatalogPage> {
    render(&state, user, &slug, query.as_deref().unwrap_or_default()).await
}

/// GET /api/catalog
pub async fn browse_all(
    State(state): State<AppState>,
    user: Option<SessionUser>,
    RawQuery(query): RawQuery,
) -> ApiResult<CatalogPage> {
    let slug = state.catalog.config().all_devices_slug.clone();
    render(&state, user, &slug, query.as_deref().unwrap_or_default()).await
}

async fn render(
    state: &AppState,
    user: Option<SessionUser>,
    slug: &str,
    query: &str,
) -> ApiResult<CatalogPage> {
    let view = state.catalog.browse(slug, query).await;

    let mut in_cart = BTreeSet::new();
    if let Some(user) = user {
        match state.carts.get(&user.user_id).await {
            Ok(cart) => {
                in_cart = view
                    .products
                    .iter()
                    .filter(|p| cart.is_in_cart(&p.id))
                    .map(|p| p.id.clone())
                    .collect();
            }
            // The listing still renders; items show as not in cart
            Err(e) => tracing::warn!(user_id = %user.user_id, error = %e, "Cart unavailable for listing"),
        }
    }

    Ok(ApiResponse::success(CatalogPage::new(view, &in_cart)))
}

/// GET /api/facets
pub async fn entry_facets(
    State(state): State<AppState>,
    user: SessionUser,
) -> ApiResult<FacetCatalog> {
    let context = FacetContext::for_role(user.role.as_deref(), &state.config.catalog.roles);
    if context != FacetContext::DataEntry {
        return Err(AppError::new(ErrorCode::DataEntryRoleRequired));
    }
    let facets = state.catalog.entry_facets().await?;
    Ok(ApiResponse::success(facets))
}
