//! Per-user cart mirror
//!
//! Keeps the set of products in one user's cart, answers membership
//! queries locally and serializes mutations against the cart store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::json;
use shared::models::{AuditAction, CartLine};
use tokio::sync::Mutex;

use super::error::CartError;
use crate::audit::AuditService;
use crate::backend::{BackendError, CartMutation, CartStore};
use crate::config::ConflictCodes;

pub struct CartReconciler {
    user_id: String,
    store: Arc<dyn CartStore>,
    audit: Arc<AuditService>,
    codes: ConflictCodes,
    /// product_id -> line
    lines: RwLock<BTreeMap<String, CartLine>>,
    /// Held for the duration of a mutation
    in_flight: Mutex<()>,
}

impl std::fmt::Debug for CartReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartReconciler")
            .field("user_id", &self.user_id)
            .field("lines", &self.lines.read().len())
            .finish_non_exhaustive()
    }
}

impl CartReconciler {
    pub fn new(
        user_id: impl Into<String>,
        store: Arc<dyn CartStore>,
        audit: Arc<AuditService>,
        codes: ConflictCodes,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            store,
            audit,
            codes,
            lines: RwLock::new(BTreeMap::new()),
            in_flight: Mutex::new(()),
        }
    }

    /// Create and populate from the store
    pub async fn load(
        user_id: impl Into<String>,
        store: Arc<dyn CartStore>,
        audit: Arc<AuditService>,
        codes: ConflictCodes,
    ) -> Result<Self, CartError> {
        let reconciler = Self::new(user_id, store, audit, codes);
        reconciler.reload().await?;
        Ok(reconciler)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Replace the local mirror with the store's lines, after any
    /// in-flight mutation settles
    pub async fn refresh(&self) -> Result<(), CartError> {
        let _guard = self.in_flight.lock().await;
        self.reload().await
    }

    /// Caller holds `in_flight` or owns the reconciler exclusively
    async fn reload(&self) -> Result<(), CartError> {
        let lines = self
            .store
            .fetch_lines(&self.user_id)
            .await
            .map_err(CartError::Load)?;
        let mirror = lines
            .into_iter()
            .map(|line| (line.product_id.clone(), line))
            .collect();
        *self.lines.write() = mirror;
        Ok(())
    }

    pub fn is_in_cart(&self, product_id: &str) -> bool {
        self.lines.read().contains_key(product_id)
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }

    /// Add a product; an existing line is a conflict, never an increment
    pub async fn add(&self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        let _guard = self.in_flight.lock().await;
        let details = json!({ "quantity": quantity });

        // Stored as INTEGER, so the upper bound is i32::MAX
        let result = match i32::try_from(quantity) {
            Ok(stored) if stored > 0 => self.insert(product_id, quantity).await.map(|()| stored),
            _ => Err(CartError::InvalidQuantity(quantity)),
        };

        match result {
            Ok(stored) => {
                self.lines.write().insert(
                    product_id.to_string(),
                    CartLine {
                        user_id: self.user_id.clone(),
                        product_id: product_id.to_string(),
                        quantity: stored,
                        created_at: Some(Utc::now()),
                    },
                );
                tracing::info!(user_id = %self.user_id, product_id = %product_id, quantity, "Added to cart");
                self.audit
                    .cart(AuditAction::CartItemAdded, &self.user_id, Some(product_id), Ok(()), details);
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, product_id = %product_id, error = %e, "Add to cart rejected");
                self.audit.cart(
                    AuditAction::CartItemAdded,
                    &self.user_id,
                    Some(product_id),
                    Err(&e.to_string()),
                    details,
                );
                if matches!(e, CartError::AlreadyInCart(_)) {
                    // Another session inserted the line first
                    self.refresh_after_mutation().await;
                }
                Err(e)
            }
        }
    }

    /// Remove a product; absent products succeed trivially
    pub async fn remove(&self, product_id: &str) -> Result<(), CartError> {
        let _guard = self.in_flight.lock().await;
        let result = self
            .store
            .mutate(
                &self.user_id,
                CartMutation::Delete {
                    product_id: product_id.to_string(),
                },
            )
            .await
            .map_err(CartError::Update);

        match result {
            Ok(()) => {
                self.lines.write().remove(product_id);
                tracing::info!(user_id = %self.user_id, product_id = %product_id, "Removed from cart");
                self.audit.cart(
                    AuditAction::CartItemRemoved,
                    &self.user_id,
                    Some(product_id),
                    Ok(()),
                    serde_json::Value::Null,
                );
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, product_id = %product_id, error = %e, "Remove from cart failed");
                self.audit.cart(
                    AuditAction::CartItemRemoved,
                    &self.user_id,
                    Some(product_id),
                    Err(&e.to_string()),
                    serde_json::Value::Null,
                );
                Err(e)
            }
        }
    }

    /// Remove every line; an empty cart succeeds trivially
    pub async fn clear(&self) -> Result<(), CartError> {
        let _guard = self.in_flight.lock().await;
        let removed = self.len();
        let result = self
            .store
            .mutate(&self.user_id, CartMutation::DeleteAll)
            .await
            .map_err(CartError::Update);

        match result {
            Ok(()) => {
                self.lines.write().clear();
                tracing::info!(user_id = %self.user_id, removed, "Cleared cart");
                self.audit.cart(
                    AuditAction::CartCleared,
                    &self.user_id,
                    None,
                    Ok(()),
                    json!({ "removed": removed }),
                );
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "Clear cart failed");
                self.audit.cart(
                    AuditAction::CartCleared,
                    &self.user_id,
                    None,
                    Err(&e.to_string()),
                    serde_json::Value::Null,
                );
                Err(e)
            }
        }
    }

    /// Insert unless the line exists; a local hit is confirmed against the
    /// store first since the mirror may predate changes made elsewhere
    async fn insert(&self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if self.is_in_cart(product_id) {
            self.reload().await?;
            if self.is_in_cart(product_id) {
                return Err(CartError::AlreadyInCart(product_id.to_string()));
            }
        }
        self.store
            .mutate(
                &self.user_id,
                CartMutation::Insert {
                    product_id: product_id.to_string(),
                    quantity,
                },
            )
            .await
            .map_err(|e| self.classify(product_id, e))
    }

    fn classify(&self, product_id: &str, err: BackendError) -> CartError {
        match err.code() {
            Some(code) if code == self.codes.unique_violation => {
                CartError::AlreadyInCart(product_id.to_string())
            }
            Some(code) if code == self.codes.foreign_key_violation => {
                CartError::ProductMissing(product_id.to_string())
            }
            _ => CartError::Update(err),
        }
    }

    /// The local mirror already reflects the mutation; a failed refresh keeps it
    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.reload().await {
            tracing::warn!(user_id = %self.user_id, error = %e, "Cart refresh after mutation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::config::CatalogConfig;
    use shared::models::{AuditEvent, AuditStatus, ProductRow};
    use tokio::sync::mpsc;

    fn product(id: &str) -> ProductRow {
        ProductRow {
            id: id.into(),
            name: id.into(),
            ..Default::default()
        }
    }

    async fn setup() -> (Arc<MemoryBackend>, CartReconciler, mpsc::Receiver<AuditEvent>) {
        let backend = Arc::new(MemoryBackend::with_products(vec![product("p1"), product("p2")]));
        let (audit, rx) = AuditService::new(32);
        let cart = CartReconciler::load(
            "u1",
            backend.clone(),
            audit,
            CatalogConfig::default().conflict_codes,
        )
        .await
        .unwrap();
        (backend, cart, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<AuditEvent>) -> Vec<AuditEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_add_twice_is_a_conflict() {
        let (backend, cart, mut rx) = setup().await;

        cart.add("p1", 1).await.unwrap();
        assert!(cart.is_in_cart("p1"));

        let err = cart.add("p1", 1).await.unwrap_err();
        assert!(matches!(err, CartError::AlreadyInCart(_)));
        assert_eq!(backend.fetch_lines("u1").await.unwrap().len(), 1);

        let statuses: Vec<AuditStatus> = drain(&mut rx).into_iter().map(|e| e.status).collect();
        assert_eq!(statuses, [AuditStatus::Success, AuditStatus::Failure]);
    }

    #[tokio::test]
    async fn test_backend_unique_violation_is_classified() {
        let (backend, cart, _rx) = setup().await;
        // Another session added p1 behind this mirror's back
        backend
            .mutate("u1", CartMutation::Insert { product_id: "p1".into(), quantity: 1 })
            .await
            .unwrap();
        assert!(!cart.is_in_cart("p1"));

        let err = cart.add("p1", 2).await.unwrap_err();
        assert!(matches!(err, CartError::AlreadyInCart(_)));
        // The conflict triggers a refresh
        assert!(cart.is_in_cart("p1"));
    }

    #[tokio::test]
    async fn test_missing_product_and_generic_failure() {
        let (backend, cart, _rx) = setup().await;
        let err = cart.add("gone", 1).await.unwrap_err();
        assert!(matches!(err, CartError::ProductMissing(_)));

        backend.set_outage(Some("connection reset"));
        let err = cart.add("p2", 1).await.unwrap_err();
        assert!(matches!(err, CartError::Update(_)));
        assert!(!cart.is_in_cart("p2"));
    }

    #[tokio::test]
    async fn test_invalid_quantity() {
        let (backend, cart, _rx) = setup().await;
        let err = cart.add("p1", 0).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(0)));

        let too_many = i32::MAX as u32 + 1;
        let err = cart.add("p1", too_many).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(q) if q == too_many));
        assert!(cart.is_empty());
        assert!(backend.fetch_lines("u1").await.unwrap().is_empty());

        cart.add("p1", i32::MAX as u32).await.unwrap();
        assert_eq!(cart.lines()[0].quantity, i32::MAX);
    }

    #[tokio::test]
    async fn test_external_clear_is_not_a_conflict() {
        let (backend, cart, _rx) = setup().await;
        cart.add("p1", 1).await.unwrap();

        // Checkout or another instance empties the cart behind the mirror
        backend.mutate("u1", CartMutation::DeleteAll).await.unwrap();
        assert!(cart.is_in_cart("p1"));

        cart.add("p1", 2).await.unwrap();
        let lines = backend.fetch_lines("u1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert!(cart.is_in_cart("p1"));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_external_changes() {
        let (backend, cart, _rx) = setup().await;
        cart.add("p1", 1).await.unwrap();
        backend.mutate("u1", CartMutation::DeleteAll).await.unwrap();
        backend
            .mutate("u1", CartMutation::Insert { product_id: "p2".into(), quantity: 1 })
            .await
            .unwrap();

        cart.refresh().await.unwrap();
        assert!(!cart.is_in_cart("p1"));
        assert!(cart.is_in_cart("p2"));
    }

    #[tokio::test]
    async fn test_remove_and_clear_are_idempotent() {
        let (_backend, cart, mut rx) = setup().await;
        cart.remove("p1").await.unwrap();
        cart.clear().await.unwrap();

        cart.add("p1", 1).await.unwrap();
        cart.add("p2", 3).await.unwrap();
        cart.remove("p1").await.unwrap();
        cart.remove("p1").await.unwrap();
        assert_eq!(cart.len(), 1);

        cart.clear().await.unwrap();
        cart.clear().await.unwrap();
        assert!(cart.is_empty());

        let actions: Vec<AuditAction> = drain(&mut rx).into_iter().map(|e| e.action).collect();
        assert_eq!(actions.len(), 8);
        let added = actions.iter().filter(|a| **a == AuditAction::CartItemAdded).count();
        assert_eq!(added, 2);
    }

    #[tokio::test]
    async fn test_audit_failure_never_blocks_mutation() {
        let backend = Arc::new(MemoryBackend::with_products(vec![product("p1")]));
        let (audit, rx) = AuditService::new(1);
        drop(rx);
        let cart = CartReconciler::new("u1", backend.clone(), audit, CatalogConfig::default().conflict_codes);
        cart.add("p1", 1).await.unwrap();
        assert!(cart.is_in_cart("p1"));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_local_state() {
        let (backend, cart, _rx) = setup().await;
        cart.add("p1", 1).await.unwrap();
        backend.set_outage(Some("down"));
        assert!(matches!(cart.refresh().await, Err(CartError::Load(_))));
        assert!(cart.is_in_cart("p1"));
    }
}
