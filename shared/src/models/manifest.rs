//! Order product manifest
//!
//! Orders and closed sales store their products as two parallel lists
//! (ids and quantities), each in any legacy encoding. Every consumer goes
//! through [`OrderProductManifest::lines`] so they all decode identically.

use serde::{Deserialize, Serialize};

use crate::legacy::{RawField, parse_list, parse_quantities};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderProductManifest {
    #[serde(default)]
    pub product_ids: RawField,
    #[serde(default)]
    pub quantities: RawField,
}

/// Decoded manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestLine {
    pub product_id: String,
    pub quantity: u32,
}

impl OrderProductManifest {
    pub fn new(product_ids: impl Into<RawField>, quantities: impl Into<RawField>) -> Self {
        Self {
            product_ids: product_ids.into(),
            quantities: quantities.into(),
        }
    }

    pub fn product_ids(&self) -> Vec<String> {
        parse_list(&self.product_ids)
    }

    /// Quantities padded with 1 up to the product count
    pub fn quantities(&self) -> Vec<u32> {
        parse_quantities(&self.quantities, self.product_ids().len())
    }

    /// Product/quantity pairs; surplus quantities are ignored
    pub fn lines(&self) -> Vec<ManifestLine> {
        let ids = self.product_ids();
        let quantities = parse_quantities(&self.quantities, ids.len());
        ids.into_iter()
            .zip(quantities)
            .map(|(product_id, quantity)| ManifestLine {
                product_id,
                quantity,
            })
            .collect()
    }

    pub fn total_units(&self) -> u64 {
        self.lines().iter().map(|l| u64::from(l.quantity)).sum()
    }
}
