//! Shopping cart

mod error;
mod reconciler;

pub use error::CartError;
pub use reconciler::CartReconciler;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::audit::AuditService;
use crate::backend::CartStore;
use crate::config::{CartSessionConfig, ConflictCodes};

struct Session {
    cart: Arc<CartReconciler>,
    last_used: Instant,
}

/// One [`CartReconciler`] per user
///
/// A cached mirror is refreshed from the store every time it is handed
/// out. Mirrors idle past the TTL are dropped once no request holds them,
/// and the least recently used one goes when the cache is full.
pub struct CartSessions {
    store: Arc<dyn CartStore>,
    audit: Arc<AuditService>,
    codes: ConflictCodes,
    limits: CartSessionConfig,
    sessions: RwLock<HashMap<String, Session>>,
}

impl CartSessions {
    pub fn new(
        store: Arc<dyn CartStore>,
        audit: Arc<AuditService>,
        codes: ConflictCodes,
        limits: CartSessionConfig,
    ) -> Self {
        Self {
            store,
            audit,
            codes,
            limits,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The user's reconciler, in sync with the store
    pub async fn get(&self, user_id: &str) -> Result<Arc<CartReconciler>, CartError> {
        if let Some(cart) = self.touch(user_id) {
            cart.refresh().await?;
            return Ok(cart);
        }

        let loaded = Arc::new(
            CartReconciler::load(
                user_id,
                self.store.clone(),
                self.audit.clone(),
                self.codes.clone(),
            )
            .await?,
        );
        Ok(self.insert(user_id, loaded))
    }

    /// Drop a cached session; the next access reloads it
    pub fn evict(&self, user_id: &str) {
        self.sessions.write().remove(user_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn touch(&self, user_id: &str) -> Option<Arc<CartReconciler>> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(user_id)?;
        session.last_used = Instant::now();
        Some(session.cart.clone())
    }

    fn insert(&self, user_id: &str, loaded: Arc<CartReconciler>) -> Arc<CartReconciler> {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        // A concurrent first load may have won; keep the existing one
        if let Some(existing) = sessions.get_mut(user_id) {
            existing.last_used = now;
            return existing.cart.clone();
        }

        self.prune(&mut sessions, now);
        sessions.insert(
            user_id.to_string(),
            Session {
                cart: loaded.clone(),
                last_used: now,
            },
        );
        loaded
    }

    fn prune(&self, sessions: &mut HashMap<String, Session>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, session| {
            Arc::strong_count(&session.cart) > 1
                || now.duration_since(session.last_used) < self.limits.idle_ttl
        });

        while sessions.len() >= self.limits.capacity.max(1) {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_used)
                .map(|(user_id, _)| user_id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
        }

        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, remaining = sessions.len(), "Pruned cart sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CartMutation, MemoryBackend};
    use crate::config::CatalogConfig;
    use shared::models::ProductRow;
    use std::time::Duration;

    fn sessions_with(limits: CartSessionConfig) -> (Arc<MemoryBackend>, CartSessions) {
        let backend = Arc::new(MemoryBackend::with_products(vec![ProductRow {
            id: "p1".into(),
            name: "P1".into(),
            ..Default::default()
        }]));
        let (audit, _rx) = AuditService::new(8);
        let sessions = CartSessions::new(
            backend.clone(),
            audit,
            CatalogConfig::default().conflict_codes,
            limits,
        );
        (backend, sessions)
    }

    #[tokio::test]
    async fn test_sessions_are_cached_per_user() {
        let (_backend, sessions) = sessions_with(CartSessionConfig::default());

        let first = sessions.get("u1").await.unwrap();
        first.add("p1", 1).await.unwrap();

        let again = sessions.get("u1").await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(again.is_in_cart("p1"));

        let other = sessions.get("u2").await.unwrap();
        assert!(!other.is_in_cart("p1"));
        assert_eq!(sessions.len(), 2);

        sessions.evict("u1");
        let reloaded = sessions.get("u1").await.unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert!(reloaded.is_in_cart("p1"));
    }

    #[tokio::test]
    async fn test_cached_mirror_follows_external_clear() {
        let (backend, sessions) = sessions_with(CartSessionConfig::default());
        sessions.get("u1").await.unwrap().add("p1", 1).await.unwrap();

        backend.mutate("u1", CartMutation::DeleteAll).await.unwrap();

        let cart = sessions.get("u1").await.unwrap();
        assert!(!cart.is_in_cart("p1"));
        cart.add("p1", 1).await.unwrap();
        assert_eq!(backend.fetch_lines("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_capacity_drops_least_recently_used() {
        let (_backend, sessions) = sessions_with(CartSessionConfig {
            capacity: 2,
            idle_ttl: Duration::from_secs(3600),
        });

        let u1 = sessions.get("u1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        sessions.get("u2").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        sessions.get("u3").await.unwrap();
        assert_eq!(sessions.len(), 2);

        // u1 was the oldest and was dropped
        let again = sessions.get("u1").await.unwrap();
        assert!(!Arc::ptr_eq(&u1, &again));
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_unless_held() {
        let (_backend, sessions) = sessions_with(CartSessionConfig {
            capacity: 100,
            idle_ttl: Duration::ZERO,
        });

        drop(sessions.get("u1").await.unwrap());
        let held = sessions.get("u2").await.unwrap();
        assert_eq!(sessions.len(), 1);

        sessions.get("u3").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(Arc::ptr_eq(&held, &sessions.get("u2").await.unwrap()));
    }
}
