//! Shared test helpers for integration tests.

use std::sync::Arc;

use tempfile::TempDir;

use archive_auth::AccessEnforcer;
use archive_cache::ListingCache;
use archive_core::config::{ReconciliationConfig, StorageConfig};
use archive_database::{MemoryDatabase, Stores};
use archive_entity::academic::{Semester, SemesterType};
use archive_entity::user::{User, UserRole};
use archive_service::{
    FileArchiveService, FilesystemScanner, FolderProvisioner, HierarchyNavigator,
    LoggingUploadNotifier,
};
use archive_storage::{LocalStore, PathResolver};
use archive_worker::ReconciliationJob;

/// Test application context
pub struct TestApp {
    /// Keeps the upload root alive
    pub dir: TempDir,
    /// Seedable in-memory database
    pub db: Arc<MemoryDatabase>,
    /// Store handles over `db`
    pub stores: Stores,
    /// Upload tree
    pub store: LocalStore,
    pub scanner: FilesystemScanner,
    pub navigator: HierarchyNavigator,
    pub provisioner: FolderProvisioner,
    pub archive: FileArchiveService,
    pub reconciliation: ReconciliationJob,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Arc::new(PathResolver::new(dir.path()).await.unwrap());
        let store = LocalStore::new(Arc::clone(&resolver));
        let db = MemoryDatabase::new();
        let stores = db.stores();
        let enforcer = AccessEnforcer::default();
        let storage = StorageConfig {
            upload_root: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };

        let cache = Arc::new(ListingCache::new());
        let scanner =
            FilesystemScanner::new(store.clone(), cache, stores.clone(), enforcer.clone());
        let navigator = HierarchyNavigator::new(stores.clone(), enforcer.clone());
        let provisioner = FolderProvisioner::new(stores.clone(), resolver, enforcer.clone());
        let archive = FileArchiveService::new(
            stores.clone(),
            store.clone(),
            provisioner.clone(),
            scanner.clone(),
            enforcer,
            storage,
            Arc::new(LoggingUploadNotifier),
        );
        let reconciliation = ReconciliationJob::new(
            stores.clone(),
            store.clone(),
            scanner.clone(),
            ReconciliationConfig::default(),
        );

        Self {
            dir,
            db,
            stores,
            store,
            scanner,
            navigator,
            provisioner,
            archive,
            reconciliation,
        }
    }

    /// Year `2024-2025`, its first semester, and professor John Doe of
    /// department 1 teaching CS101.
    pub async fn seed(&self) -> (Semester, User) {
        let year = self.db.add_year("2024-2025").await;
        let semester = self.db.add_semester(year.id, SemesterType::First).await;
        let john = self
            .db
            .add_user("John", "Doe", UserRole::Professor, Some(1))
            .await;
        let course = self.db.add_course("CS101", "Intro", Some(1)).await;
        self.db
            .add_assignment(semester.id, course.id, john.id)
            .await;
        (semester, john)
    }

    /// Whether `path` is a directory under the upload root.
    pub fn is_dir(&self, path: &str) -> bool {
        self.dir.path().join(path).is_dir()
    }
}
