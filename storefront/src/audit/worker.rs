use std::sync::Arc;

use shared::models::AuditEvent;
use tokio::sync::mpsc;

use crate::backend::AuditSink;

/// Drains the audit channel into a sink
pub struct AuditWorker {
    sink: Arc<dyn AuditSink>,
}

impl AuditWorker {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Run until every sender is dropped
    pub async fn run(self, mut rx: mpsc::Receiver<AuditEvent>) {
        tracing::info!("Audit worker started");

        while let Some(event) = rx.recv().await {
            let action = event.action;
            let user_id = event.user_id.clone();
            match self.sink.record(event).await {
                Ok(()) => {
                    tracing::debug!(action = %action, user_id = %user_id, "Audit entry recorded");
                }
                Err(e) => {
                    tracing::error!(
                        action = %action,
                        user_id = %user_id,
                        error = %e,
                        "Failed to write audit entry"
                    );
                }
            }
        }

        tracing::info!("Audit channel closed, worker stopping");
    }
}
