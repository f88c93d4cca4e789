//! Backend collaborators
//!
//! The storefront core never talks to storage directly. It reads products,
//! reads and mutates cart lines, reads closed sales, and records audit
//! events through the traits below. [`MemoryBackend`] backs tests and local runs,
//! [`PgBackend`] the hosted PostgreSQL store.

pub mod memory;
pub mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

use async_trait::async_trait;
use shared::models::{AuditEvent, CartLine, FilterDimension, ProductRow};
use thiserror::Error;

use crate::reports::WinRecord;

/// SQLSTATE raised on a unique-constraint violation
pub const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised on a foreign-key violation
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Collaborator failure
#[derive(Debug, Error)]
pub enum BackendError {
    /// The store rejected the statement with a classified code
    #[error("backend rejected request (code {code}): {message}")]
    Rejected { code: String, message: String },

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("malformed backend row: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Backend code of a rejected statement
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
                BackendError::Rejected {
                    code,
                    message: db.message().to_string(),
                }
            }
            other @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) => {
                BackendError::Decode(other.to_string())
            }
            other => BackendError::Unavailable(other.to_string()),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Predicate operator pushed into the product query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOp {
    Eq,
    In,
}

/// A single server-side constraint on a categorical column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub dimension: FilterDimension,
    pub op: PredicateOp,
    pub values: Vec<String>,
}

impl Predicate {
    /// Equality for one value, set membership for several
    pub fn for_values(dimension: FilterDimension, values: Vec<String>) -> Self {
        let op = if values.len() == 1 {
            PredicateOp::Eq
        } else {
            PredicateOp::In
        };
        Self {
            dimension,
            op,
            values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// Newest listing first, undated rows last
    #[default]
    RecentFirst,
}

/// Product read request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub predicates: Vec<Predicate>,
    /// Case-insensitive substring on name or SKU
    pub search: Option<String>,
    pub order_by: OrderBy,
}

impl ProductQuery {
    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty() && self.search.is_none()
    }
}

/// Cart-line mutation for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMutation {
    Insert { product_id: String, quantity: u32 },
    Delete { product_id: String },
    DeleteAll,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn query_products(&self, query: &ProductQuery) -> BackendResult<Vec<ProductRow>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn fetch_lines(&self, user_id: &str) -> BackendResult<Vec<CartLine>>;

    /// Apply a mutation; conflicts surface as [`BackendError::Rejected`]
    async fn mutate(&self, user_id: &str, mutation: CartMutation) -> BackendResult<()>;
}

#[async_trait]
pub trait WinStore: Send + Sync {
    /// Every closed sale, most recent first
    async fn fetch_wins(&self) -> BackendResult<Vec<WinRecord>>;
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> BackendResult<()>;
}
