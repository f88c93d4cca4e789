//! Legacy field normalization
//!
//! Several columns (gallery URLs, technology lists, order product ids and
//! quantities) were historically written in more than one format for the
//! same logical list:
//!
//! ```text
//! ["a","b"]            native array
//! "[\"a\",\"b\"]"      JSON text
//! "\"[\\\"a\\\"]\""    JSON text of JSON text
//! "[a, b]"             bracketed, unquoted
//! "a,b"                comma separated
//! "a"                  single scalar
//! ```
//!
//! [`RawField`] captures the shape at the data-access boundary and
//! [`parse_list`] is the only place that turns it into a canonical list.
//! Parsing never fails: anything unreadable normalizes to an empty list.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A list-like column as it arrived from storage
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum RawField {
    /// Native sequence (JSON array / SQL array)
    Native(Vec<Value>),
    /// Text of unknown encoding; the full parse ladder applies
    Encoded(String),
    /// Text known to be a single scalar value
    Plain(String),
    /// Null, missing, or a shape that cannot hold a list
    #[default]
    Absent,
}

impl RawField {
    /// Canonical list view of this field
    pub fn to_list(&self) -> Vec<String> {
        parse_list(self)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RawField::Absent)
    }
}

impl From<Value> for RawField {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => RawField::Native(items),
            Value::String(text) => RawField::Encoded(text),
            Value::Number(n) => RawField::Plain(n.to_string()),
            Value::Null | Value::Bool(_) | Value::Object(_) => RawField::Absent,
        }
    }
}

impl From<Option<Value>> for RawField {
    fn from(value: Option<Value>) -> Self {
        value.map(RawField::from).unwrap_or_default()
    }
}

impl From<Vec<String>> for RawField {
    fn from(items: Vec<String>) -> Self {
        RawField::Native(items.into_iter().map(Value::String).collect())
    }
}

impl From<&str> for RawField {
    fn from(text: &str) -> Self {
        RawField::Encoded(text.to_string())
    }
}

impl<'de> Deserialize<'de> for RawField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Any JSON shape is accepted; unusable shapes become Absent
        Option::<Value>::deserialize(deserializer).map(RawField::from)
    }
}

/// Normalize a raw field into an ordered list of trimmed, non-empty strings
pub fn parse_list(raw: &RawField) -> Vec<String> {
    match raw {
        RawField::Native(items) => from_items(items),
        RawField::Encoded(text) => parse_text(text),
        RawField::Plain(text) => singleton(text),
        RawField::Absent => Vec::new(),
    }
}

/// Normalize a JSON value into a list
pub fn parse_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => from_items(items),
        Value::String(text) => parse_text(text),
        Value::Number(n) => vec![n.to_string()],
        Value::Null | Value::Bool(_) | Value::Object(_) => Vec::new(),
    }
}

/// Normalize a text column of unknown encoding into a list
pub fn parse_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => from_items(&items),
        // Doubly encoded: the first decode produced more JSON text
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(inner.trim()) {
            Ok(Value::Array(items)) => from_items(&items),
            Ok(Value::String(scalar)) => singleton(&scalar),
            Ok(Value::Null) | Ok(Value::Object(_)) => Vec::new(),
            Ok(_) => singleton(&inner),
            Err(_) => split_fallback(&inner),
        },
        Ok(Value::Null) | Ok(Value::Object(_)) => Vec::new(),
        Ok(_) => singleton(trimmed),
        Err(_) => split_fallback(trimmed),
    }
}

/// Decode a quantity list aligned with a product-id list of `target_len`
///
/// Each element is read as a leading integer; anything non-numeric or
/// below 1 becomes 1. The list is right-padded with 1 up to `target_len`
/// and never truncated.
pub fn parse_quantities(raw: &RawField, target_len: usize) -> Vec<u32> {
    let mut quantities: Vec<u32> = parse_list(raw).iter().map(|q| coerce_quantity(q)).collect();
    if quantities.len() < target_len {
        quantities.resize(target_len, 1);
    }
    quantities
}

/// Read the leading integer of `text`, falling back to 1
pub fn coerce_quantity(text: &str) -> u32 {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());

    match digits[..end].parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => n,
    }
}

fn from_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn singleton(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}

fn split_fallback(text: &str) -> Vec<String> {
    if text.contains(['[', ']']) {
        let stripped: String = text
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | '"' | '\''))
            .collect();
        split_commas(&stripped)
    } else if text.contains(',') {
        split_commas(text)
    } else {
        singleton(text)
    }
}

fn split_commas(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
