//! Access policy, enforcement, and denial auditing.

pub mod access;
pub mod audit;
pub mod enforcer;

pub use access::{AccessPolicy, FileOwner};
pub use audit::{AuditSink, TracingAuditSink};
pub use enforcer::AccessEnforcer;
