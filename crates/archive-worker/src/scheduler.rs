//! Cron scheduler for the reconciliation sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info};

use archive_core::error::AppError;

use crate::jobs::ReconciliationJob;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Reconciliation sweep fired on each tick
    reconciliation: Arc<ReconciliationJob>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(reconciliation: Arc<ReconciliationJob>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            reconciliation,
        })
    }

    /// Register all scheduled tasks
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_reconciliation().await?;

        info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }

    /// Reconciliation on the configured cron expression. Disabled sweeps are
    /// still registered so that the skip is logged on each tick.
    async fn register_reconciliation(&self) -> Result<(), AppError> {
        let cron = self.reconciliation.config().cron.clone();
        let reconciliation = Arc::clone(&self.reconciliation);
        let job = CronJob::new_async(cron.as_str(), move |_uuid, _lock| {
            let reconciliation = Arc::clone(&reconciliation);
            Box::pin(async move {
                debug!("Running scheduled reconciliation");
                if let Some(result) = reconciliation.run_scheduled().await {
                    if !result.errors.is_empty() {
                        error!(
                            errors = result.errors.len(),
                            "Reconciliation finished with errors"
                        );
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::scheduler(format!(
                "Failed to create reconciliation schedule '{cron}': {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::scheduler(format!("Failed to add reconciliation schedule: {e}"))
        })?;

        info!(cron = %cron, "Registered: reconciliation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use archive_auth::AccessEnforcer;
    use archive_cache::ListingCache;
    use archive_core::config::ReconciliationConfig;
    use archive_core::error::ErrorKind;
    use archive_database::MemoryDatabase;
    use archive_service::FilesystemScanner;
    use archive_storage::{LocalStore, PathResolver};

    use super::*;

    async fn job(cron: &str) -> (tempfile::TempDir, Arc<ReconciliationJob>) {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Arc::new(PathResolver::new(dir.path()).await.unwrap());
        let store = LocalStore::new(resolver);
        let stores = MemoryDatabase::new().stores();
        let cache = Arc::new(ListingCache::new());
        let enforcer = AccessEnforcer::default();
        let scanner = FilesystemScanner::new(store.clone(), cache, stores.clone(), enforcer);
        let config = ReconciliationConfig {
            cron: cron.to_string(),
            ..Default::default()
        };
        let job = ReconciliationJob::new(stores, store, scanner, config);
        (dir, Arc::new(job))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_registers_configured_cron() {
        let (_dir, job) = job("0 */15 * * * *").await;
        let mut scheduler = CronScheduler::new(job).await.unwrap();
        scheduler.register_default_tasks().await.unwrap();
        scheduler.start().await.unwrap();
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_bad_cron() {
        let (_dir, job) = job("every now and then").await;
        let scheduler = CronScheduler::new(job).await.unwrap();
        let err = scheduler.register_default_tasks().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Scheduler);
    }
}
