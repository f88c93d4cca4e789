//! Filter selection <-> URL query parameters
//!
//! Each filter dimension owns one query key holding a comma-separated value
//! list (`form_factor=Laptop,Tablet`). Reserved keys (`q`, `page`, `_`) and
//! unknown keys pass through untouched.

use std::fmt;

use shared::models::{FilterDimension, FilterSelection};

/// Keys never interpreted as filters
pub const RESERVED_KEYS: [&str; 3] = ["q", "page", "_"];

/// Ordered query parameter list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// Last value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every occurrence of `key` with a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove(&key);
        self.0.push((key, value.into()));
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Read the filter selection out of query parameters
///
/// A repeated key keeps its last occurrence.
pub fn decode(params: &QueryParams) -> FilterSelection {
    let mut selection = FilterSelection::new();
    for (key, value) in params.iter() {
        if is_reserved(key) {
            continue;
        }
        let Some(dimension) = FilterDimension::from_param_key(key) else {
            continue;
        };
        selection.set(dimension, value.split(','));
    }
    selection
}

/// Write `selection` over `existing`, keeping every non-filter parameter
pub fn encode(selection: &FilterSelection, existing: &QueryParams) -> QueryParams {
    let mut params: QueryParams = existing
        .iter()
        .filter(|(key, _)| FilterDimension::from_param_key(key).is_none())
        .collect();

    for (dimension, values) in selection.iter() {
        if values.is_empty() {
            continue;
        }
        let joined = values.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        params.0.push((dimension.param_key().to_string(), joined));
    }
    params
}

/// A navigation that replaces the current history entry without reloading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryReplace {
    pub query: String,
}

/// Filter selection bound to the page's query parameters
///
/// Every mutation re-encodes immediately, so the selection and the URL
/// never disagree after a call returns.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    selection: FilterSelection,
    params: QueryParams,
}

impl FilterState {
    pub fn from_query(query: &str) -> Self {
        let params = QueryParams::parse(query);
        Self {
            selection: decode(&params),
            params,
        }
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn toggle(&mut self, dimension: FilterDimension, value: &str) -> HistoryReplace {
        self.selection.toggle(dimension, value);
        self.sync()
    }

    pub fn set<I, S>(&mut self, dimension: FilterDimension, values: I) -> HistoryReplace
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.set(dimension, values);
        self.sync()
    }

    pub fn clear(&mut self, dimension: FilterDimension) -> HistoryReplace {
        self.selection.clear(dimension);
        self.sync()
    }

    pub fn clear_all(&mut self) -> HistoryReplace {
        self.selection.clear_all();
        self.sync()
    }

    fn sync(&mut self) -> HistoryReplace {
        self.params = encode(&self.selection, &self.params);
        HistoryReplace {
            query: self.params.to_query_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptops_and_tablets() -> FilterSelection {
        FilterSelection::new().with(FilterDimension::FormFactor, ["Laptop", "Tablet"])
    }

    #[test]
    fn test_round_trip() {
        let selection = laptops_and_tablets()
            .with(FilterDimension::FiveG, ["true"])
            .with(FilterDimension::ScreenSize, ["13.5\""]);
        let encoded = encode(&selection, &QueryParams::new());
        assert_eq!(decode(&encoded), selection);

        // Through the textual form as well
        let reparsed = QueryParams::parse(&encoded.to_query_string());
        assert_eq!(decode(&reparsed), selection);
    }

    #[test]
    fn test_unrelated_params_survive() {
        let existing = QueryParams::parse("?q=foo&form_factor=Desktop&page=2");
        let encoded = encode(&laptops_and_tablets(), &existing);
        assert_eq!(encoded.get("q"), Some("foo"));
        assert_eq!(encoded.get("page"), Some("2"));
        assert_eq!(encoded.get("form_factor"), Some("Laptop,Tablet"));
        assert_eq!(
            encoded.to_query_string(),
            "q=foo&page=2&form_factor=Laptop%2CTablet"
        );
    }

    #[test]
    fn test_empty_selection_omits_keys() {
        let existing = QueryParams::parse("memory=16GB&q=surface");
        let encoded = encode(&FilterSelection::new(), &existing);
        assert_eq!(encoded.get("memory"), None);
        assert_eq!(encoded.to_query_string(), "q=surface");
    }

    #[test]
    fn test_decode_trims_and_ignores_unknown() {
        let params = QueryParams::parse("form_factor=%20Laptop%20,,Tablet&color=red&q=x&_=dev-1");
        let selection = decode(&params);
        assert_eq!(selection, laptops_and_tablets());
    }

    #[test]
    fn test_decode_last_occurrence_wins() {
        let params = QueryParams::parse("memory=8GB&memory=16GB");
        let selection = decode(&params);
        assert!(selection.contains(FilterDimension::Memory, "16GB"));
        assert!(!selection.contains(FilterDimension::Memory, "8GB"));
    }

    #[test]
    fn test_filter_state_replaces_history() {
        let mut state = FilterState::from_query("q=surface&copilot=true");
        assert!(state.selection().contains(FilterDimension::Copilot, "true"));

        let nav = state.toggle(FilterDimension::FormFactor, "Laptop");
        // Filter keys are written in dimension order
        assert_eq!(nav.query, "q=surface&form_factor=Laptop&copilot=true");

        let nav = state.clear(FilterDimension::Copilot);
        assert_eq!(nav.query, "q=surface&form_factor=Laptop");

        let nav = state.set(FilterDimension::Memory, ["32GB", "16GB"]);
        assert_eq!(nav.query, "q=surface&form_factor=Laptop&memory=16GB%2C32GB");
        assert_eq!(decode(state.params()), state.selection().clone());

        let nav = state.clear_all();
        assert_eq!(nav.query, "q=surface");
        assert!(state.selection().is_empty());
    }
}
