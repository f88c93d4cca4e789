//! Cart Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One product in a user's cart
///
/// At most one line exists per (user, product); adding an existing product
/// is a conflict, not a quantity increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub user_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub created_at: Option<DateTime<Utc>>,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartAdd {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
