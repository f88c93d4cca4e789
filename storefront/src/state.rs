//! Application state

use std::sync::Arc;

use shared::models::AuditEvent;
use tokio::sync::mpsc;

use crate::audit::{AuditService, AuditWorker};
use crate::backend::{AuditSink, CartStore, ProductStore, WinStore};
use crate::cart::CartSessions;
use crate::catalog::CatalogService;
use crate::config::Config;
use crate::reports::ReportService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogService>,
    pub carts: Arc<CartSessions>,
    pub reports: Arc<ReportService>,
    pub audit: Arc<AuditService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .field("cart_sessions", &self.carts.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire components over one backend; the caller drives the audit receiver
    pub fn new<B>(config: Config, backend: Arc<B>) -> (Self, mpsc::Receiver<AuditEvent>)
    where
        B: ProductStore + CartStore + WinStore + 'static,
    {
        let (audit, rx) = AuditService::new(config.audit_buffer_size);
        let catalog = CatalogService::new(backend.clone(), config.catalog.clone());
        let carts = CartSessions::new(
            backend.clone(),
            audit.clone(),
            config.catalog.conflict_codes.clone(),
            config.cart_sessions,
        );
        let reports = ReportService::new(backend);
        let state = Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            carts: Arc::new(carts),
            reports: Arc::new(reports),
            audit,
        };
        (state, rx)
    }

    /// Like [`AppState::new`], with the audit worker spawned on the runtime
    pub fn start<B>(config: Config, backend: Arc<B>) -> Self
    where
        B: ProductStore + CartStore + WinStore + AuditSink + 'static,
    {
        let (state, rx) = Self::new(config, backend.clone());
        tokio::spawn(AuditWorker::new(backend).run(rx));
        state
    }
}
