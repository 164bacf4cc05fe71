//! Archive server: academic document archive over a virtual hierarchy.
//!
//! Main entry point that wires all crates together and hosts the
//! reconciliation scheduler until shutdown.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use archive_auth::AccessEnforcer;
use archive_cache::ListingCache;
use archive_core::config::AppConfig;
use archive_database::DatabasePool;
use archive_service::{
    FileArchiveService, FilesystemScanner, FolderProvisioner, HierarchyNavigator,
    LoggingUploadNotifier,
};
use archive_storage::{LocalStore, PathResolver};
use archive_worker::{CronScheduler, ReconciliationJob};

#[tokio::main]
async fn main() {
    let env = std::env::var("ARCHIVE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e:#}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting archive server v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection (migrations run on connect) ──
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database)
        .await
        .context("Database connection failed")?;
    let stores = db.stores();

    // ── Step 2: Upload root ──────────────────────────────────────
    let resolver = Arc::new(
        PathResolver::new(&config.storage.upload_root)
            .await
            .context("Upload root initialization failed")?,
    );
    tracing::info!(root = %resolver.root().display(), "Upload root ready");
    let store = LocalStore::new(Arc::clone(&resolver));

    // ── Step 3: Services ─────────────────────────────────────────
    let enforcer = AccessEnforcer::default();
    let cache = Arc::new(ListingCache::new());
    let scanner = FilesystemScanner::new(store.clone(), cache, stores.clone(), enforcer.clone());
    let navigator = HierarchyNavigator::new(stores.clone(), enforcer.clone());
    let provisioner = FolderProvisioner::new(stores.clone(), resolver, enforcer.clone());
    let archive = FileArchiveService::new(
        stores.clone(),
        store.clone(),
        provisioner,
        scanner.clone(),
        enforcer,
        config.storage.clone(),
        Arc::new(LoggingUploadNotifier),
    );
    tracing::debug!(?navigator, ?archive, "Services initialized");

    // ── Step 4: Reconciliation ───────────────────────────────────
    let reconciliation = Arc::new(ReconciliationJob::new(
        stores,
        store,
        scanner,
        config.reconciliation.clone(),
    ));
    if config.reconciliation.run_on_startup {
        tracing::info!("Running startup reconciliation...");
        let result = reconciliation.run_now().await;
        if !result.errors.is_empty() {
            tracing::warn!(
                errors = result.errors.len(),
                "Startup reconciliation reported errors"
            );
        }
    }

    let mut scheduler = CronScheduler::new(Arc::clone(&reconciliation))
        .await
        .context("Scheduler init failed")?;
    scheduler.register_default_tasks().await?;
    scheduler.start().await?;

    tracing::info!("Archive server running; press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    // ── Shutdown ─────────────────────────────────────────────────
    tracing::info!("Shutdown signal received");
    scheduler.shutdown().await?;
    db.close().await;
    tracing::info!("Archive server stopped");
    Ok(())
}
