//! Filter dimensions and selections

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A filterable product dimension
///
/// The set is fixed: five categorical specification fields plus two
/// boolean feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterDimension {
    FormFactor,
    Processor,
    Memory,
    Storage,
    ScreenSize,
    /// AI-capable (Copilot+) flag
    Copilot,
    /// Cellular-capable flag
    #[serde(rename = "fiveGEnabled")]
    FiveG,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 7] = [
        FilterDimension::FormFactor,
        FilterDimension::Processor,
        FilterDimension::Memory,
        FilterDimension::Storage,
        FilterDimension::ScreenSize,
        FilterDimension::Copilot,
        FilterDimension::FiveG,
    ];

    /// Dimensions whose values are derived from product data
    pub const CATEGORICAL: [FilterDimension; 5] = [
        FilterDimension::FormFactor,
        FilterDimension::Processor,
        FilterDimension::Memory,
        FilterDimension::Storage,
        FilterDimension::ScreenSize,
    ];

    /// Yes/No dimensions with fixed values
    pub const FLAGS: [FilterDimension; 2] = [FilterDimension::Copilot, FilterDimension::FiveG];

    /// URL query parameter carrying this dimension
    pub const fn param_key(&self) -> &'static str {
        match self {
            Self::FormFactor => "form_factor",
            Self::Processor => "processor",
            Self::Memory => "memory",
            Self::Storage => "storage",
            Self::ScreenSize => "screen_size",
            Self::Copilot => "copilot",
            Self::FiveG => "five_g",
        }
    }

    /// Reverse of [`param_key`](Self::param_key)
    pub fn from_param_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.param_key() == key)
    }

    /// Selection-map key used by clients
    pub const fn field_key(&self) -> &'static str {
        match self {
            Self::FormFactor => "formFactor",
            Self::Processor => "processor",
            Self::Memory => "memory",
            Self::Storage => "storage",
            Self::ScreenSize => "screenSize",
            Self::Copilot => "copilot",
            Self::FiveG => "fiveGEnabled",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::FormFactor => "Form Factor",
            Self::Processor => "Processor",
            Self::Memory => "Memory",
            Self::Storage => "Storage",
            Self::ScreenSize => "Screen Size",
            Self::Copilot => "Copilot+ PC",
            Self::FiveG => "5G",
        }
    }

    pub const fn is_flag(&self) -> bool {
        matches!(self, Self::Copilot | Self::FiveG)
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_key())
    }
}

/// Selected values per dimension
///
/// Only non-empty sets are stored: an absent dimension means "no
/// constraint", so two selections that differ only by empty sets are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSelection(BTreeMap<FilterDimension, BTreeSet<String>>);

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection for `dimension`; blank values are dropped
    pub fn set<I, S>(&mut self, dimension: FilterDimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values
            .into_iter()
            .map(Into::into)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            self.0.remove(&dimension);
        } else {
            self.0.insert(dimension, values);
        }
    }

    /// Builder form of [`set`](Self::set)
    pub fn with<I, S>(mut self, dimension: FilterDimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(dimension, values);
        self
    }

    /// Add the value if absent, remove it if present
    pub fn toggle(&mut self, dimension: FilterDimension, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let entry = self.0.entry(dimension).or_default();
        if !entry.remove(value) {
            entry.insert(value.to_string());
        }
        if entry.is_empty() {
            self.0.remove(&dimension);
        }
    }

    pub fn clear(&mut self, dimension: FilterDimension) {
        self.0.remove(&dimension);
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    /// Selected values for `dimension`, if constrained
    pub fn get(&self, dimension: FilterDimension) -> Option<&BTreeSet<String>> {
        self.0.get(&dimension)
    }

    pub fn contains(&self, dimension: FilterDimension, value: &str) -> bool {
        self.0.get(&dimension).is_some_and(|set| set.contains(value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constrained dimensions with their values, in dimension order
    pub fn iter(&self) -> impl Iterator<Item = (FilterDimension, &BTreeSet<String>)> {
        self.0.iter().map(|(d, v)| (*d, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_keys_round_trip() {
        for dim in FilterDimension::ALL {
            assert_eq!(FilterDimension::from_param_key(dim.param_key()), Some(dim));
        }
        assert_eq!(FilterDimension::from_param_key("q"), None);
        assert_eq!(FilterDimension::FiveG.field_key(), "fiveGEnabled");
    }

    #[test]
    fn test_flags_are_not_categorical() {
        for dim in FilterDimension::FLAGS {
            assert!(dim.is_flag());
            assert!(!FilterDimension::CATEGORICAL.contains(&dim));
        }
    }

    #[test]
    fn test_empty_set_means_unconstrained() {
        let mut selection = FilterSelection::new();
        selection.set(FilterDimension::Memory, ["16GB"]);
        selection.set(FilterDimension::Memory, Vec::<String>::new());
        assert!(selection.is_empty());
        assert_eq!(selection, FilterSelection::new());

        selection.set(FilterDimension::Storage, [" ", ""]);
        assert!(selection.get(FilterDimension::Storage).is_none());
    }

    #[test]
    fn test_toggle() {
        let mut selection = FilterSelection::new();
        selection.toggle(FilterDimension::FormFactor, "Laptop");
        selection.toggle(FilterDimension::FormFactor, "Tablet");
        assert!(selection.contains(FilterDimension::FormFactor, "Laptop"));

        selection.toggle(FilterDimension::FormFactor, "Laptop");
        selection.toggle(FilterDimension::FormFactor, "Tablet");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_serialize_with_field_keys() {
        let selection = FilterSelection::new()
            .with(FilterDimension::FiveG, ["true"])
            .with(FilterDimension::FormFactor, ["Tablet", "Laptop"]);
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "formFactor": ["Laptop", "Tablet"],
                "fiveGEnabled": ["true"],
            })
        );
    }
}
