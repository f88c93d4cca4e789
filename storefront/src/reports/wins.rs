//! Win (closed sale) reporting

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::OrderProductManifest;

/// A closed sale as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinRecord {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(flatten)]
    pub manifest: OrderProductManifest,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductUnits {
    pub product_id: String,
    pub units: u64,
    /// Number of wins that included the product
    pub wins: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WinSummary {
    pub total_wins: usize,
    pub total_units: u64,
    /// Units descending, then product id
    pub by_product: Vec<ProductUnits>,
}

pub fn summarize(records: &[WinRecord]) -> WinSummary {
    let mut per_product: BTreeMap<String, (u64, usize)> = BTreeMap::new();
    let mut total_units = 0;

    for record in records {
        let lines = record.manifest.lines();
        if lines.is_empty() {
            tracing::debug!(win_id = %record.id, "Win has no decodable products");
        }
        for line in lines {
            let units = u64::from(line.quantity);
            total_units += units;
            let entry = per_product.entry(line.product_id).or_default();
            entry.0 += units;
            entry.1 += 1;
        }
    }

    let mut by_product: Vec<ProductUnits> = per_product
        .into_iter()
        .map(|(product_id, (units, wins))| ProductUnits {
            product_id,
            units,
            wins,
        })
        .collect();
    by_product.sort_by(|a, b| {
        b.units
            .cmp(&a.units)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });

    WinSummary {
        total_wins: records.len(),
        total_units,
        by_product,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarize_mixed_encodings() {
        let records: Vec<WinRecord> = serde_json::from_value(json!([
            { "id": "w1", "product_ids": ["p1", "p2"], "quantities": "[3, 1]" },
            { "id": "w2", "product_ids": "\"[\\\"p2\\\",\\\"p3\\\",\\\"p1\\\"]\"", "quantities": "2" },
            { "id": "w3", "product_ids": "p3", "quantities": null, "customer": "Contoso" },
            { "id": "w4", "product_ids": null },
        ]))
        .unwrap();

        let summary = summarize(&records);
        assert_eq!(summary.total_wins, 4);
        // w1: p1 3, p2 1 / w2: p2 2, p3 1, p1 1 / w3: p3 1
        assert_eq!(summary.total_units, 9);
        assert_eq!(
            summary.by_product,
            vec![
                ProductUnits { product_id: "p1".into(), units: 4, wins: 2 },
                ProductUnits { product_id: "p2".into(), units: 3, wins: 2 },
                ProductUnits { product_id: "p3".into(), units: 2, wins: 2 },
            ]
        );
    }

    #[test]
    fn test_ties_order_by_product_id() {
        let records = vec![
            WinRecord {
                id: "w1".into(),
                customer: None,
                manifest: OrderProductManifest::new("b,a", "1,1"),
                closed_at: None,
            },
        ];
        let ids: Vec<String> = summarize(&records)
            .by_product
            .into_iter()
            .map(|p| p.product_id)
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(summarize(&[]), WinSummary::default());
    }
}
