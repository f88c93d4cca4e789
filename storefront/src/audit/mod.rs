//! Cart audit trail
//!
//! Producers push events into a bounded channel and never wait; the worker
//! drains it into an [`AuditSink`](crate::backend::AuditSink).

mod service;
mod worker;

pub use service::{AuditService, CART_EVENT_TYPE};
pub use worker::AuditWorker;
