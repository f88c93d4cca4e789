//! Facet catalog

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::filter::FilterDimension;

/// Synthetic facet value asking a data-entry form for free text
pub const CUSTOM_FACET_VALUE: &str = "Custom";

/// One selectable value of a Yes/No dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagOption {
    pub value: String,
    pub label: String,
}

/// Selectable values per dimension
///
/// Categorical values are sorted and de-duplicated; flag options are fixed
/// configuration and never derived from data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCatalog {
    pub categorical: BTreeMap<FilterDimension, Vec<String>>,
    pub flags: BTreeMap<FilterDimension, Vec<FlagOption>>,
}

impl FacetCatalog {
    /// Values offered for a categorical dimension (empty for flags)
    pub fn values(&self, dimension: FilterDimension) -> &[String] {
        self.categorical
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Options offered for a flag dimension (empty for categorical ones)
    pub fn flag_options(&self, dimension: FilterDimension) -> &[FlagOption] {
        self.flags.get(&dimension).map(Vec::as_slice).unwrap_or(&[])
    }
}
