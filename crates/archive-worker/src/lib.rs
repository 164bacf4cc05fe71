//! Background maintenance for the archive.
//!
//! This crate provides:
//! - The reconciliation job that repairs drift between folder/file rows and
//!   the upload tree
//! - A cron scheduler that fires the job on the configured expression

pub mod jobs;
pub mod scheduler;

pub use jobs::{ReconciliationJob, ReconciliationResult};
pub use scheduler::CronScheduler;
