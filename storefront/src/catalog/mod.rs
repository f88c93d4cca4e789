//! Catalog browsing: facets, URL filter codec, query planning,
//! residual filtering and listing order

pub mod facets;
pub mod filter;
pub mod ordering;
pub mod planner;
pub mod service;
pub mod url_codec;

pub use facets::{FacetContext, build_facets, resolve_entry_value};
pub use filter::{apply_filters, apply_residual};
pub use ordering::order;
pub use planner::{NavigationContext, QueryOutcome, QueryPlan};
pub use service::{CatalogService, CatalogView, EmptyState};
pub use url_codec::{FilterState, HistoryReplace, QueryParams};
