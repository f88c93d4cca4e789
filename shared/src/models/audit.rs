//! Audit event Model

use serde::{Deserialize, Serialize};

/// Audited action (enum, not free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    CartItemAdded,
    CartItemRemoved,
    CartCleared,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CartItemAdded => "cart_item_added",
            Self::CartItemRemoved => "cart_item_removed",
            Self::CartCleared => "cart_cleared",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
}

impl AuditLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Failure,
}

impl AuditStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Audit record handed to the audit collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event family, e.g. "cart"
    pub event_type: String,
    pub level: AuditLevel,
    pub action: AuditAction,
    pub message: String,
    pub user_id: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub status: AuditStatus,
    /// Unix millis
    pub timestamp: i64,
}
