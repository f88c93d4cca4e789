//! Filter facet derivation

use std::collections::{BTreeMap, BTreeSet};

use shared::error::{AppError, ErrorCode};
use shared::models::{FacetCatalog, FilterDimension, FlagOption, Product};

use crate::config::{CatalogConfig, RoleConfig};

/// Where the facet list is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetContext {
    /// Storefront filtering
    Browse,
    /// Device onboarding forms; categorical lists end with the custom sentinel
    DataEntry,
}

impl FacetContext {
    pub fn for_role(role: Option<&str>, roles: &RoleConfig) -> Self {
        match role {
            Some(role) if roles.is_data_entry(role) => Self::DataEntry,
            _ => Self::Browse,
        }
    }
}

/// Derive the selectable values per dimension from a product collection
///
/// Categorical values are de-duplicated and sorted; blanks are dropped.
/// Flag options come from configuration, not from the data.
pub fn build_facets(
    products: &[Product],
    context: FacetContext,
    config: &CatalogConfig,
) -> FacetCatalog {
    let mut categorical = BTreeMap::new();
    for dimension in FilterDimension::CATEGORICAL {
        let observed: BTreeSet<&str> = products
            .iter()
            .filter_map(|p| p.spec(dimension))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();

        let mut values: Vec<String> = observed.into_iter().map(str::to_string).collect();
        if context == FacetContext::DataEntry {
            values.push(config.custom_sentinel.clone());
        }
        categorical.insert(dimension, values);
    }

    let options = vec![
        FlagOption {
            value: config.flags.true_value.clone(),
            label: "Yes".into(),
        },
        FlagOption {
            value: config.flags.false_value.clone(),
            label: "No".into(),
        },
    ];
    let flags = FilterDimension::FLAGS
        .into_iter()
        .map(|dimension| (dimension, options.clone()))
        .collect();

    FacetCatalog { categorical, flags }
}

/// Effective value of a data-entry field
///
/// Choosing the sentinel requires non-blank override text.
pub fn resolve_entry_value(
    choice: &str,
    custom_text: Option<&str>,
    sentinel: &str,
) -> Result<String, AppError> {
    if choice.trim() != sentinel {
        return Ok(choice.trim().to_string());
    }
    match custom_text.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AppError::new(ErrorCode::CustomValueRequired).with_detail("sentinel", sentinel)),
    }
}
