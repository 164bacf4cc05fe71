//! Scheduled job implementations.

pub mod reconciliation;

pub use reconciliation::{FileVerdict, FolderVerdict, ReconciliationJob, ReconciliationResult};
