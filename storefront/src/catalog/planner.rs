//! Product query planning
//!
//! Categorical selections are pushed into the backend query. Flag
//! selections are always evaluated after the fetch.

use shared::models::{FilterDimension, FilterSelection, ProductRow};

use crate::backend::{BackendError, OrderBy, Predicate, ProductQuery, ProductStore};
use crate::config::CatalogConfig;

/// What the shopper navigated to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationContext {
    AllDevices,
    /// A category name or free-text slug
    Slug(String),
}

impl NavigationContext {
    pub fn from_slug(slug: &str, config: &CatalogConfig) -> Self {
        let slug = slug.trim();
        if slug.is_empty() || slug.eq_ignore_ascii_case(&config.all_devices_slug) {
            Self::AllDevices
        } else {
            Self::Slug(slug.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub query: ProductQuery,
    /// Dimensions left for the client-side filter
    pub residual: Vec<FilterDimension>,
}

/// Result of running a plan; a failed query yields no rows and the error
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub rows: Vec<ProductRow>,
    pub error: Option<BackendError>,
}

/// Whether a dimension maps to a backend column
pub fn is_pushable(dimension: FilterDimension) -> bool {
    !dimension.is_flag()
}

pub fn plan(context: &NavigationContext, selection: &FilterSelection) -> QueryPlan {
    let mut predicates = Vec::new();
    let mut residual = Vec::new();

    for (dimension, values) in selection.iter() {
        if values.is_empty() {
            continue;
        }
        if is_pushable(dimension) {
            predicates.push(Predicate::for_values(
                dimension,
                values.iter().cloned().collect(),
            ));
        } else {
            residual.push(dimension);
        }
    }

    // Predicates replace the slug search; without them the slug is the search
    let search = match context {
        NavigationContext::Slug(slug) if predicates.is_empty() => Some(slug.clone()),
        _ => None,
    };

    QueryPlan {
        query: ProductQuery {
            predicates,
            search,
            order_by: OrderBy::RecentFirst,
        },
        residual,
    }
}

/// Run a plan once; errors are reported, not retried
pub async fn execute(store: &dyn ProductStore, plan: &QueryPlan) -> QueryOutcome {
    match store.query_products(&plan.query).await {
        Ok(rows) => {
            tracing::debug!(
                count = rows.len(),
                predicates = plan.query.predicates.len(),
                search = ?plan.query.search,
                "Product query finished"
            );
            QueryOutcome { rows, error: None }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Product query failed");
            QueryOutcome {
                rows: Vec::new(),
                error: Some(e),
            }
        }
    }
}
