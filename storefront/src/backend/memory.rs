//! In-memory backend
//!
//! Mirrors the constraints of the hosted store: one cart line per
//! (user, product), cart lines must reference an existing product.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use shared::models::{AuditEvent, CartLine, FilterDimension, ProductRow};

use super::{
    AuditSink, BackendError, BackendResult, CartMutation, CartStore, OrderBy, PredicateOp,
    ProductQuery, ProductStore, WinStore, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION,
};
use crate::reports::WinRecord;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    products: RwLock<Vec<ProductRow>>,
    /// user_id -> product_id -> line
    carts: RwLock<BTreeMap<String, BTreeMap<String, CartLine>>>,
    wins: RwLock<Vec<WinRecord>>,
    audit: RwLock<Vec<AuditEvent>>,
    /// When set, every call fails with this message
    outage: RwLock<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<ProductRow>) -> Self {
        Self {
            products: RwLock::new(products),
            ..Self::default()
        }
    }

    pub fn insert_product(&self, product: ProductRow) {
        let mut products = self.products.write();
        products.retain(|p| p.id != product.id);
        products.push(product);
    }

    /// Delete a product along with any cart lines pointing at it
    pub fn remove_product(&self, product_id: &str) {
        self.products.write().retain(|p| p.id != product_id);
        for lines in self.carts.write().values_mut() {
            lines.remove(product_id);
        }
    }

    pub fn insert_win(&self, win: WinRecord) {
        let mut wins = self.wins.write();
        wins.retain(|w| w.id != win.id);
        wins.push(win);
    }

    /// Simulate an unreachable store
    pub fn set_outage(&self, message: Option<&str>) {
        *self.outage.write() = message.map(str::to_string);
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit.read().clone()
    }

    fn check_available(&self) -> BackendResult<()> {
        match self.outage.read().as_ref() {
            Some(message) => Err(BackendError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

fn matches_query(row: &ProductRow, query: &ProductQuery) -> bool {
    let predicates_pass = query.predicates.iter().all(|predicate| {
        let column = match predicate.dimension {
            FilterDimension::FormFactor => &row.form_factor,
            FilterDimension::Processor => &row.processor,
            FilterDimension::Memory => &row.memory,
            FilterDimension::Storage => &row.storage,
            FilterDimension::ScreenSize => &row.screen_size,
            // Flags have no backend column
            _ => return true,
        };
        // Facets offer trimmed values, so compare trimmed
        let Some(value) = column.as_deref().map(str::trim) else {
            return false;
        };
        match predicate.op {
            PredicateOp::Eq => predicate.values.first().is_some_and(|v| v.trim() == value),
            PredicateOp::In => predicate.values.iter().any(|v| v.trim() == value),
        }
    });
    if !predicates_pass {
        return false;
    }

    match &query.search {
        Some(term) => {
            let needle = term.to_lowercase();
            row.name.to_lowercase().contains(&needle)
                || row
                    .sku
                    .as_deref()
                    .is_some_and(|sku| sku.to_lowercase().contains(&needle))
        }
        None => true,
    }
}

#[async_trait]
impl ProductStore for MemoryBackend {
    async fn query_products(&self, query: &ProductQuery) -> BackendResult<Vec<ProductRow>> {
        self.check_available()?;
        let mut rows: Vec<ProductRow> = self
            .products
            .read()
            .iter()
            .filter(|row| matches_query(row, query))
            .cloned()
            .collect();

        match query.order_by {
            // Option orders None first, so descending puts undated rows last
            OrderBy::RecentFirst => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(rows)
    }
}

#[async_trait]
impl CartStore for MemoryBackend {
    async fn fetch_lines(&self, user_id: &str) -> BackendResult<Vec<CartLine>> {
        self.check_available()?;
        Ok(self
            .carts
            .read()
            .get(user_id)
            .map(|lines| lines.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn mutate(&self, user_id: &str, mutation: CartMutation) -> BackendResult<()> {
        self.check_available()?;
        match mutation {
            CartMutation::Insert {
                product_id,
                quantity,
            } => {
                if !self.products.read().iter().any(|p| p.id == product_id) {
                    return Err(BackendError::rejected(
                        FOREIGN_KEY_VIOLATION,
                        format!("product {product_id} does not exist"),
                    ));
                }
                let mut carts = self.carts.write();
                let lines = carts.entry(user_id.to_string()).or_default();
                if lines.contains_key(&product_id) {
                    return Err(BackendError::rejected(
                        UNIQUE_VIOLATION,
                        "duplicate key value violates unique constraint",
                    ));
                }
                let quantity = i32::try_from(quantity).map_err(|_| {
                    BackendError::rejected("22003", "quantity out of range")
                })?;
                lines.insert(
                    product_id.clone(),
                    CartLine {
                        user_id: user_id.to_string(),
                        product_id,
                        quantity,
                        created_at: Some(Utc::now()),
                    },
                );
            }
            CartMutation::Delete { product_id } => {
                if let Some(lines) = self.carts.write().get_mut(user_id) {
                    lines.remove(&product_id);
                }
            }
            CartMutation::DeleteAll => {
                self.carts.write().remove(user_id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WinStore for MemoryBackend {
    async fn fetch_wins(&self) -> BackendResult<Vec<WinRecord>> {
        self.check_available()?;
        let mut wins = self.wins.read().clone();
        wins.sort_by(|a, b| b.closed_at.cmp(&a.closed_at));
        Ok(wins)
    }
}

#[async_trait]
impl AuditSink for MemoryBackend {
    async fn record(&self, event: AuditEvent) -> BackendResult<()> {
        self.check_available()?;
        self.audit.write().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Predicate;
    use chrono::TimeZone;

    fn row(id: &str, name: &str, form_factor: &str, year: Option<i32>) -> ProductRow {
        ProductRow {
            id: id.into(),
            name: name.into(),
            sku: Some(format!("SKU-{id}")),
            form_factor: Some(form_factor.into()),
            created_at: year.map(|y| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::with_products(vec![
            row("a", "Surface Laptop", "Laptop", Some(2023)),
            row("b", "Surface Pro", "Tablet", None),
            row("c", "ThinkPad X1", "Laptop", Some(2025)),
        ])
    }

    fn ids(rows: &[ProductRow]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_unfiltered_is_recent_first_missing_last() {
        let rows = backend()
            .query_products(&ProductQuery::default())
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_predicates_and_search() {
        let backend = backend();
        let query = ProductQuery {
            predicates: vec![Predicate::for_values(
                FilterDimension::FormFactor,
                vec!["Laptop".into()],
            )],
            ..Default::default()
        };
        assert_eq!(ids(&backend.query_products(&query).await.unwrap()), vec!["c", "a"]);

        let query = ProductQuery {
            search: Some("SURFACE".into()),
            ..Default::default()
        };
        assert_eq!(ids(&backend.query_products(&query).await.unwrap()), vec!["a", "b"]);

        let query = ProductQuery {
            search: Some("sku-c".into()),
            ..Default::default()
        };
        assert_eq!(ids(&backend.query_products(&query).await.unwrap()), vec!["c"]);
    }

    #[tokio::test]
    async fn test_predicates_ignore_stored_padding() {
        let backend = MemoryBackend::with_products(vec![
            row("a", "Surface Laptop", " Laptop ", Some(2024)),
            row("b", "Surface Pro", "Tablet", Some(2023)),
        ]);
        let query = ProductQuery {
            predicates: vec![Predicate::for_values(
                FilterDimension::FormFactor,
                vec!["Laptop".into()],
            )],
            ..Default::default()
        };
        assert_eq!(ids(&backend.query_products(&query).await.unwrap()), vec!["a"]);

        let query = ProductQuery {
            predicates: vec![Predicate::for_values(
                FilterDimension::FormFactor,
                vec!["Laptop".into(), "Tablet".into()],
            )],
            ..Default::default()
        };
        assert_eq!(ids(&backend.query_products(&query).await.unwrap()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_cart_constraints() {
        let backend = backend();
        let insert = |id: &str| CartMutation::Insert {
            product_id: id.into(),
            quantity: 1,
        };

        backend.mutate("u1", insert("a")).await.unwrap();
        let err = backend.mutate("u1", insert("a")).await.unwrap_err();
        assert_eq!(err.code(), Some(UNIQUE_VIOLATION));

        let err = backend.mutate("u1", insert("zzz")).await.unwrap_err();
        assert_eq!(err.code(), Some(FOREIGN_KEY_VIOLATION));

        // Other users are independent
        backend.mutate("u2", insert("a")).await.unwrap();
        assert_eq!(backend.fetch_lines("u1").await.unwrap().len(), 1);

        backend.mutate("u1", CartMutation::DeleteAll).await.unwrap();
        backend.mutate("u1", CartMutation::DeleteAll).await.unwrap();
        assert!(backend.fetch_lines("u1").await.unwrap().is_empty());
        assert_eq!(backend.fetch_lines("u2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_outage() {
        let backend = backend();
        backend.set_outage(Some("connection refused"));
        let err = backend
            .query_products(&ProductQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));

        backend.set_outage(None);
        assert!(backend.query_products(&ProductQuery::default()).await.is_ok());
    }
}
