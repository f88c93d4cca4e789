use std::sync::Arc;

use serde_json::Value;
use shared::models::{AuditAction, AuditEvent, AuditLevel, AuditStatus};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

pub const CART_EVENT_TYPE: &str = "cart";

/// Fire-and-forget audit recorder
#[derive(Debug)]
pub struct AuditService {
    tx: mpsc::Sender<AuditEvent>,
}

impl AuditService {
    pub fn new(buffer_size: usize) -> (Arc<Self>, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Arc::new(Self { tx }), rx)
    }

    /// Queue an event; a full or closed channel drops it with a warning
    pub fn log(&self, event: AuditEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    action = %event.action,
                    user_id = %event.user_id,
                    "Audit channel full, dropping entry"
                );
            }
            Err(TrySendError::Closed(event)) => {
                tracing::error!(
                    action = %event.action,
                    user_id = %event.user_id,
                    "Audit channel closed, dropping entry"
                );
            }
        }
    }

    /// Record the outcome of a cart mutation
    pub fn cart(
        &self,
        action: AuditAction,
        user_id: &str,
        product_id: Option<&str>,
        outcome: Result<(), &str>,
        details: Value,
    ) {
        let (level, status, message) = match outcome {
            Ok(()) => (AuditLevel::Info, AuditStatus::Success, success_message(action)),
            Err(reason) => (
                AuditLevel::Warning,
                AuditStatus::Failure,
                format!("{} failed: {reason}", action),
            ),
        };
        self.log(AuditEvent {
            event_type: CART_EVENT_TYPE.to_string(),
            level,
            action,
            message,
            user_id: user_id.to_string(),
            entity_id: product_id.map(str::to_string),
            details,
            status,
            timestamp: shared::util::now_millis(),
        });
    }
}

fn success_message(action: AuditAction) -> String {
    match action {
        AuditAction::CartItemAdded => "Added device to cart",
        AuditAction::CartItemRemoved => "Removed device from cart",
        AuditAction::CartCleared => "Cleared cart",
    }
    .to_string()
}
