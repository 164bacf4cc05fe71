//! Database/disk reconciliation sweep.
//!
//! Folder and file rows and the upload tree are two sources of truth that
//! cannot be updated atomically. The sweep classifies every row against the
//! disk and repairs the difference: primary folders whose directory vanished
//! are recreated, while file rows and custom folders whose bytes vanished
//! are dropped. Row deletions of one sweep share a single transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use archive_core::config::ReconciliationConfig;
use archive_core::error::ErrorKind;
use archive_core::result::AppResult;
use archive_database::{StoreTransaction, Stores};
use archive_entity::file::UploadedFile;
use archive_entity::folder::Folder;
use archive_service::FilesystemScanner;
use archive_storage::{LocalStore, PathResolver};

/// What the sweep does with a folder row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderVerdict {
    /// Directory present.
    Ok,
    /// Primary folder missing on disk: recreate the directory.
    Recreate,
    /// Custom folder missing on disk: drop the row.
    Remove,
}

/// What the sweep does with a file row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileVerdict {
    /// Regular file present.
    Ok,
    /// Bytes missing: drop the row.
    Remove,
}

/// A row that cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Finding {
    Warning(String),
    Error(String),
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Sweep start.
    pub started_at: DateTime<Utc>,
    /// Sweep end.
    pub finished_at: DateTime<Utc>,
    /// Wall time in milliseconds.
    pub duration_ms: i64,
    /// File rows examined.
    pub files_scanned: u64,
    /// Folder rows examined.
    pub folders_scanned: u64,
    /// File rows deleted.
    pub orphaned_files_removed: u64,
    /// Folder rows deleted.
    pub orphaned_folders_removed: u64,
    /// Directories recreated.
    pub folders_recreated: u64,
    /// `file_url` of every file found missing.
    pub orphaned_files: Vec<String>,
    /// Path of every custom folder found missing.
    pub orphaned_folders: Vec<String>,
    /// Path of every directory recreated.
    pub recreated_folders: Vec<String>,
    /// Rows that were skipped.
    pub warnings: Vec<String>,
    /// Rows that could not be checked or repaired.
    pub errors: Vec<String>,
}

impl ReconciliationResult {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            files_scanned: 0,
            folders_scanned: 0,
            orphaned_files_removed: 0,
            orphaned_folders_removed: 0,
            folders_recreated: 0,
            orphaned_files: Vec::new(),
            orphaned_folders: Vec::new(),
            recreated_folders: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn finish(&mut self) {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at).num_milliseconds();
    }

    /// Whether the sweep changed the database or the disk.
    pub fn has_changes(&self) -> bool {
        self.orphaned_files_removed > 0
            || self.orphaned_folders_removed > 0
            || self.folders_recreated > 0
    }

    fn record(&mut self, finding: Finding) {
        match finding {
            Finding::Warning(message) => {
                warn!(message = %message, "Reconciliation warning");
                self.warnings.push(message);
            }
            Finding::Error(message) => {
                error!(message = %message, "Reconciliation error");
                self.errors.push(message);
            }
        }
    }
}

/// Periodic DB/disk reconciliation.
#[derive(Debug, Clone)]
pub struct ReconciliationJob {
    /// Folder and file rows.
    stores: Stores,
    /// Upload tree.
    store: LocalStore,
    /// Invalidated after any change.
    scanner: FilesystemScanner,
    /// Sweep settings.
    config: ReconciliationConfig,
    /// Held for the duration of a sweep.
    running: Arc<Mutex<()>>,
    /// Latest outcome.
    last: Arc<RwLock<Option<ReconciliationResult>>>,
}

impl ReconciliationJob {
    /// Create a new reconciliation job
    pub fn new(
        stores: Stores,
        store: LocalStore,
        scanner: FilesystemScanner,
        config: ReconciliationConfig,
    ) -> Self {
        Self {
            stores,
            store,
            scanner,
            config,
            running: Arc::new(Mutex::new(())),
            last: Arc::new(RwLock::new(None)),
        }
    }

    /// Sweep settings.
    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Scheduled entry point. Skips when disabled or when the previous sweep
    /// is still running.
    pub async fn run_scheduled(&self) -> Option<ReconciliationResult> {
        if !self.config.enabled {
            debug!("Reconciliation disabled, skipping scheduled run");
            return None;
        }
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Previous reconciliation still running, skipping");
            return None;
        };
        Some(self.sweep().await)
    }

    /// On-demand sweep, regardless of `enabled`. Waits for a running sweep
    /// to finish first.
    pub async fn run_now(&self) -> ReconciliationResult {
        let _guard = self.running.lock().await;
        self.sweep().await
    }

    /// Outcome of the most recent sweep.
    pub async fn last_run(&self) -> Option<ReconciliationResult> {
        self.last.read().await.clone()
    }

    /// Root-relative paths of regular files under `base_path` that no file
    /// row references by `file_url` or `stored_filename`.
    pub async fn find_files_without_database_records(
        &self,
        base_path: &str,
    ) -> AppResult<Vec<String>> {
        let mut untracked = Vec::new();
        for path in self.store.walk_files(base_path).await? {
            if self.stores.files.find_by_file_url(&path).await?.is_some() {
                continue;
            }
            let name = PathResolver::get_name(&path);
            if self
                .stores
                .files
                .find_by_stored_filename(&name)
                .await?
                .is_some()
            {
                continue;
            }
            untracked.push(path);
        }
        Ok(untracked)
    }

    /// One full sweep. Never fails: every problem lands in the result.
    pub async fn reconcile(&self) -> ReconciliationResult {
        let mut result = ReconciliationResult::start();
        info!("Starting reconciliation");

        match self.stores.transactions.begin().await {
            Ok(mut tx) => {
                self.reconcile_files(&mut *tx, &mut result).await;
                self.reconcile_folders(&mut *tx, &mut result).await;
                if let Err(e) = tx.commit().await {
                    result.record(Finding::Error(format!(
                        "Failed to commit reconciliation changes: {e}"
                    )));
                    result.orphaned_files_removed = 0;
                    result.orphaned_folders_removed = 0;
                }
            }
            Err(e) => result.record(Finding::Error(format!(
                "Failed to begin reconciliation transaction: {e}"
            ))),
        }

        if result.has_changes() {
            self.scanner.invalidate_all();
        }
        result.finish();

        info!(
            files_scanned = result.files_scanned,
            folders_scanned = result.folders_scanned,
            orphaned_files_removed = result.orphaned_files_removed,
            orphaned_folders_removed = result.orphaned_folders_removed,
            folders_recreated = result.folders_recreated,
            warnings = result.warnings.len(),
            errors = result.errors.len(),
            duration_ms = result.duration_ms,
            "Reconciliation finished"
        );
        result
    }

    async fn sweep(&self) -> ReconciliationResult {
        let result = self.reconcile().await;
        *self.last.write().await = Some(result.clone());
        result
    }

    async fn reconcile_files(
        &self,
        tx: &mut dyn StoreTransaction,
        result: &mut ReconciliationResult,
    ) {
        let files = match self.stores.files.list_all().await {
            Ok(files) => files,
            Err(e) => {
                result.record(Finding::Error(format!("Failed to load file records: {e}")));
                return;
            }
        };

        for file in files {
            result.files_scanned += 1;
            match self.classify_file(&file).await {
                Ok(FileVerdict::Ok) => {}
                Ok(FileVerdict::Remove) => {
                    warn!(
                        file_id = file.id,
                        path = %file.file_url,
                        "File missing on disk"
                    );
                    result.orphaned_files.push(file.file_url.clone());
                    if !self.config.remove_orphaned_records {
                        continue;
                    }
                    match tx.delete_file(file.id).await {
                        Ok(()) => result.orphaned_files_removed += 1,
                        Err(e) => result.record(Finding::Error(format!(
                            "Failed to delete file record {}: {e}",
                            file.id
                        ))),
                    }
                }
                Err(finding) => result.record(finding),
            }
        }
    }

    async fn reconcile_folders(
        &self,
        tx: &mut dyn StoreTransaction,
        result: &mut ReconciliationResult,
    ) {
        let mut folders = match self.stores.folders.list_all().await {
            Ok(folders) => folders,
            Err(e) => {
                result.record(Finding::Error(format!("Failed to load folder records: {e}")));
                return;
            }
        };
        folders.sort_by_key(|f| f.path.len());

        for folder in folders {
            result.folders_scanned += 1;
            match self.classify_folder(&folder).await {
                Ok(FolderVerdict::Ok) => {}
                Ok(FolderVerdict::Recreate) => {
                    match self.store.resolver().ensure_directory(&folder.path).await {
                        Ok(_) => {
                            info!(
                                folder_id = folder.id,
                                path = %folder.path,
                                "Recreated folder"
                            );
                            result.folders_recreated += 1;
                            result.recreated_folders.push(folder.path.clone());
                        }
                        Err(e) => result.record(Finding::Error(format!(
                            "Failed to recreate folder '{}': {e}",
                            folder.path
                        ))),
                    }
                }
                Ok(FolderVerdict::Remove) => {
                    warn!(
                        folder_id = folder.id,
                        path = %folder.path,
                        "Custom folder missing on disk"
                    );
                    result.orphaned_folders.push(folder.path.clone());
                    if !self.config.remove_orphaned_records {
                        continue;
                    }
                    match tx.delete_folder(folder.id).await {
                        Ok(()) => result.orphaned_folders_removed += 1,
                        Err(e) => result.record(Finding::Error(format!(
                            "Failed to delete folder record {}: {e}",
                            folder.id
                        ))),
                    }
                }
                Err(finding) => result.record(finding),
            }
        }
    }

    async fn classify_file(&self, file: &UploadedFile) -> Result<FileVerdict, Finding> {
        if file.file_url.trim().is_empty() {
            return Err(Finding::Warning(format!("File {} has no file_url", file.id)));
        }
        match self.store.metadata(&file.file_url).await {
            Ok(meta) if meta.is_file => Ok(FileVerdict::Ok),
            Ok(_) => Err(Finding::Warning(format!(
                "File {} path '{}' is not a regular file",
                file.id, file.file_url
            ))),
            Err(e) if e.is_not_found() => Ok(FileVerdict::Remove),
            Err(e) if matches!(e.kind, ErrorKind::InvalidPath | ErrorKind::PathTraversal) => {
                Err(Finding::Error(format!(
                    "File {} path '{}' cannot be resolved: {e}",
                    file.id, file.file_url
                )))
            }
            Err(e) => Err(Finding::Error(format!(
                "File {} could not be checked: {e}",
                file.id
            ))),
        }
    }

    async fn classify_folder(&self, folder: &Folder) -> Result<FolderVerdict, Finding> {
        if folder.path.trim().is_empty() {
            return Err(Finding::Warning(format!("Folder {} has no path", folder.id)));
        }
        match self.store.metadata(&folder.path).await {
            Ok(meta) if meta.is_directory => Ok(FolderVerdict::Ok),
            Ok(_) => Err(Finding::Warning(format!(
                "Folder {} path '{}' is not a directory",
                folder.id, folder.path
            ))),
            Err(e) if e.is_not_found() => {
                if folder.folder_type.is_primary() {
                    Ok(FolderVerdict::Recreate)
                } else {
                    Ok(FolderVerdict::Remove)
                }
            }
            Err(e) => Err(Finding::Error(format!(
                "Folder {} path '{}' could not be checked: {e}",
                folder.id, folder.path
            ))),
        }
    }
}
