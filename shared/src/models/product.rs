//! Product Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::FilterDimension;
use crate::legacy::RawField;

/// Publish state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    Published,
    /// Anything that is not explicitly published
    #[default]
    #[serde(other)]
    Private,
}

/// Product row as read from the backend, before normalization
///
/// List-like columns keep their stored shape in [`RawField`]; nothing here
/// is ever written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    pub sku: Option<String>,
    pub form_factor: Option<String>,
    pub processor: Option<String>,
    pub memory: Option<String>,
    pub storage: Option<String>,
    pub screen_size: Option<String>,
    #[serde(default)]
    pub technologies: RawField,
    pub copilot: Option<bool>,
    pub five_g: Option<bool>,
    #[serde(default)]
    pub total_inventory: i64,
    #[serde(default)]
    pub stock_inventory: i64,
    #[serde(default)]
    pub status: PublishState,
    pub image: Option<String>,
    #[serde(default)]
    pub gallery: RawField,
    pub created_at: Option<DateTime<Utc>>,
}

/// Normalized product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub sku: Option<String>,
    pub form_factor: Option<String>,
    pub processor: Option<String>,
    pub memory: Option<String>,
    pub storage: Option<String>,
    pub screen_size: Option<String>,
    pub technologies: Vec<String>,
    pub copilot: bool,
    pub five_g: bool,
    pub total_inventory: i64,
    pub stock_inventory: i64,
    pub status: PublishState,
    pub image: Option<String>,
    pub gallery: Vec<String>,
    /// Listing date; `None` sorts as the oldest listing
    pub listed_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Categorical specification value for `dimension` (`None` for flags)
    pub fn spec(&self, dimension: FilterDimension) -> Option<&str> {
        let value = match dimension {
            FilterDimension::FormFactor => &self.form_factor,
            FilterDimension::Processor => &self.processor,
            FilterDimension::Memory => &self.memory,
            FilterDimension::Storage => &self.storage,
            FilterDimension::ScreenSize => &self.screen_size,
            FilterDimension::Copilot | FilterDimension::FiveG => return None,
        };
        value.as_deref()
    }

    /// Boolean feature flag for `dimension` (`None` for categorical dimensions)
    pub fn flag(&self, dimension: FilterDimension) -> Option<bool> {
        match dimension {
            FilterDimension::Copilot => Some(self.copilot),
            FilterDimension::FiveG => Some(self.five_g),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PublishState::Published
    }

    pub fn has_stock(&self) -> bool {
        self.stock_inventory > 0
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            technologies: row.technologies.to_list(),
            gallery: row.gallery.to_list(),
            id: row.id,
            slug: row.slug,
            name: row.name,
            sku: clean(row.sku),
            form_factor: clean(row.form_factor),
            processor: clean(row.processor),
            memory: clean(row.memory),
            storage: clean(row.storage),
            screen_size: clean(row.screen_size),
            copilot: row.copilot.unwrap_or(false),
            five_g: row.five_g.unwrap_or(false),
            total_inventory: row.total_inventory,
            stock_inventory: row.stock_inventory,
            status: row.status,
            image: clean(row.image),
            listed_at: row.created_at,
        }
    }
}

/// Trim, mapping blank strings to `None`
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_row() {
        let row: ProductRow = serde_json::from_value(serde_json::json!({
            "id": "dev-1",
            "slug": "surface-pro",
            "name": "Surface Pro",
            "sku": "  ",
            "form_factor": " Tablet ",
            "processor": "",
            "technologies": "Wi-Fi 7, Bluetooth",
            "five_g": true,
            "stock_inventory": 3,
            "total_inventory": 5,
            "status": "published",
            "gallery": "\"[\\\"a.png\\\", \\\"b.png\\\"]\"",
            "created_at": "2024-05-01T00:00:00Z"
        }))
        .unwrap();

        let product = Product::from(row);
        assert_eq!(product.form_factor.as_deref(), Some("Tablet"));
        assert_eq!(product.processor, None);
        assert_eq!(product.sku, None);
        assert_eq!(product.technologies, vec!["Wi-Fi 7", "Bluetooth"]);
        assert_eq!(product.gallery, vec!["a.png", "b.png"]);
        assert!(product.five_g);
        assert!(!product.copilot);
        assert!(product.is_published());
        assert!(product.has_stock());
        assert!(product.listed_at.is_some());
    }

    #[test]
    fn test_unknown_status_is_private() {
        let state: PublishState = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(state, PublishState::Private);
        let state: PublishState = serde_json::from_str("\"published\"").unwrap();
        assert_eq!(state, PublishState::Published);
    }

    #[test]
    fn test_spec_and_flag_accessors() {
        let product = Product::from(ProductRow {
            id: "x".into(),
            name: "X".into(),
            memory: Some("16GB".into()),
            copilot: Some(true),
            ..Default::default()
        });
        assert_eq!(product.spec(FilterDimension::Memory), Some("16GB"));
        assert_eq!(product.spec(FilterDimension::Copilot), None);
        assert_eq!(product.flag(FilterDimension::Copilot), Some(true));
        assert_eq!(product.flag(FilterDimension::Memory), None);
    }
}
