//! Audit trail for access denials.

use std::fmt;

use tracing::warn;

/// Receives every enforced access denial.
pub trait AuditSink: Send + Sync + fmt::Debug {
    /// Record that `user_id` was refused access to `resource`.
    fn record_denial(&self, user_id: i64, resource: &str, reason: &str);
}

/// Writes denials as structured `warn!` events on the `archive::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record_denial(&self, user_id: i64, resource: &str, reason: &str) {
        warn!(
            target: "archive::audit",
            user_id,
            resource,
            reason,
            "Access denied"
        );
    }
}
