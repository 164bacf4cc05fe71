//! Reconciliation sweep configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic DB/disk reconciliation sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Whether the scheduled sweep runs. On-demand runs ignore this flag.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds).
    #[serde(default = "default_cron")]
    pub cron: String,
    /// Delete DB rows for files and custom folders that vanished from disk.
    #[serde(default = "default_true")]
    pub remove_orphaned_records: bool,
    /// Run one sweep immediately after startup.
    #[serde(default)]
    pub run_on_startup: bool,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: default_cron(),
            remove_orphaned_records: true,
            run_on_startup: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cron() -> String {
    "0 */15 * * * *".to_string()
}
