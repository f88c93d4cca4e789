//! Catalog orchestration
//!
//! decode -> plan -> fetch -> normalize -> facets -> residual filter -> order

use std::sync::Arc;

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{FacetCatalog, FilterSelection, Product};

use super::facets::{FacetContext, build_facets};
use super::filter::apply_residual;
use super::ordering::order;
use super::planner::{self, NavigationContext};
use super::url_codec::{QueryParams, decode, encode};
use crate::backend::{ProductQuery, ProductStore};
use crate::config::CatalogConfig;

/// Why a listing is empty; each case has its own copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    NoMatches,
    QueryFailed,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoMatches => "No devices match your filters. Try removing a filter.",
            Self::QueryFailed => "We couldn't load devices right now. Please try again.",
        }
    }
}

/// Error banner shown above a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub code: ErrorCode,
    pub message: String,
}

/// One rendered listing page
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub products: Vec<Product>,
    pub facets: FacetCatalog,
    pub selection: FilterSelection,
    /// Canonical query string for a history-replacing navigation
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ViewError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    config: CatalogConfig,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Build the listing for `slug` under the filters in `raw_query`
    pub async fn browse(&self, slug: &str, raw_query: &str) -> CatalogView {
        let params = QueryParams::parse(raw_query);
        let selection = decode(&params);
        let context = NavigationContext::from_slug(slug, &self.config);

        let plan = planner::plan(&context, &selection);
        let outcome = planner::execute(self.store.as_ref(), &plan).await;
        let failed = outcome.error.is_some();

        let products: Vec<Product> = outcome.rows.into_iter().map(Product::from).collect();
        let facets = build_facets(&products, FacetContext::Browse, &self.config);
        let products = order(apply_residual(
            products,
            &selection,
            &plan.residual,
            &self.config.flags,
        ));

        tracing::debug!(
            slug = %slug,
            context = ?context,
            count = products.len(),
            "Catalog listing built"
        );

        let empty_state = match (failed, products.is_empty()) {
            (true, _) => Some(EmptyState::QueryFailed),
            (false, true) => Some(EmptyState::NoMatches),
            (false, false) => None,
        };

        CatalogView {
            query: encode(&selection, &params).to_query_string(),
            error: failed.then(|| ViewError {
                code: ErrorCode::CatalogQueryFailed,
                message: ErrorCode::CatalogQueryFailed.message().to_string(),
            }),
            empty_message: empty_state.map(|s| s.message()),
            empty_state,
            products,
            facets,
            selection,
        }
    }

    /// Facets for the given context from the unfiltered collection
    pub async fn facets(&self, context: FacetContext) -> Result<FacetCatalog, AppError> {
        let rows = self
            .store
            .query_products(&ProductQuery::default())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Facet query failed");
                AppError::new(ErrorCode::CatalogQueryFailed)
            })?;
        let products: Vec<Product> = rows.into_iter().map(Product::from).collect();
        Ok(build_facets(&products, context, &self.config))
    }

    /// Facets for data-entry forms, custom sentinel included
    pub async fn entry_facets(&self) -> Result<FacetCatalog, AppError> {
        self.facets(FacetContext::DataEntry).await
    }
}
