//! Reports over closed sales

pub mod wins;

pub use wins::{ProductUnits, WinRecord, WinSummary, summarize};

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};

use crate::backend::WinStore;

pub struct ReportService {
    store: Arc<dyn WinStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn WinStore>) -> Self {
        Self { store }
    }

    /// Units sold per product across every closed sale
    pub async fn win_summary(&self) -> Result<WinSummary, AppError> {
        let wins = self.store.fetch_wins().await.map_err(|e| {
            tracing::warn!(error = %e, "Win query failed");
            AppError::new(ErrorCode::ReportQueryFailed)
        })?;
        Ok(summarize(&wins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use shared::models::OrderProductManifest;

    fn win(id: &str, products: &str, quantities: &str) -> WinRecord {
        WinRecord {
            id: id.into(),
            customer: None,
            manifest: OrderProductManifest::new(products, quantities),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_summary_over_stored_wins() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_win(win("w1", "[\"p1\",\"p2\"]", "2"));
        backend.insert_win(win("w2", "p2", ""));
        let service = ReportService::new(backend);

        let summary = service.win_summary().await.unwrap();
        assert_eq!(summary.total_wins, 2);
        assert_eq!(summary.total_units, 4);
        assert_eq!(summary.by_product[0].product_id, "p1");
        assert_eq!(summary.by_product[0].units, 2);
        assert_eq!(summary.by_product[1].product_id, "p2");
        assert_eq!(summary.by_product[1].units, 2);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_report_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_outage(Some("timeout"));
        let err = ReportService::new(backend).win_summary().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReportQueryFailed);
    }
}
