use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Area an error code belongs to, by its thousands digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Catalog,
    Cart,
    /// 9xxx and anything unassigned
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Catalog,
            4 => Self::Cart,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
