//! Shared fixture for service tests: a temporary upload root over an
//! in-memory database.

use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use archive_auth::{AccessEnforcer, AuditSink};
use archive_cache::ListingCache;
use archive_core::config::StorageConfig;
use archive_database::{MemoryDatabase, Stores};
use archive_entity::academic::{AcademicYear, Course, CourseAssignment, Semester, SemesterType};
use archive_entity::user::{User, UserRole};
use archive_storage::{LocalStore, PathResolver};

use crate::file::{FileArchiveService, LoggingUploadNotifier};
use crate::hierarchy::HierarchyNavigator;
use crate::provisioning::FolderProvisioner;
use crate::scanner::FilesystemScanner;

/// Keeps every recorded denial as `(user id, resource)`.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    pub denials: Mutex<Vec<(i64, String)>>,
}

impl AuditSink for RecordingAudit {
    fn record_denial(&self, user_id: i64, resource: &str, _reason: &str) {
        self.denials
            .lock()
            .unwrap()
            .push((user_id, resource.to_string()));
    }
}

impl RecordingAudit {
    /// Denied resources of one user, in order.
    pub fn resources_of(&self, user_id: i64) -> Vec<String> {
        self.denials
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, resource)| resource.clone())
            .collect()
    }
}

pub struct Fixture {
    _dir: TempDir,
    pub db: Arc<MemoryDatabase>,
    pub stores: Stores,
    pub store: LocalStore,
    pub config: StorageConfig,
    pub scanner: FilesystemScanner,
    pub navigator: HierarchyNavigator,
    pub provisioner: FolderProvisioner,
    pub archive: FileArchiveService,
    pub audit: Arc<RecordingAudit>,
    /// Computer science department id.
    pub cs: i64,
    /// Mathematics department id.
    pub math: i64,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Arc::new(PathResolver::new(dir.path()).await.unwrap());
        let store = LocalStore::new(resolver.clone());
        let db = MemoryDatabase::new();
        let stores = db.stores();
        let audit = Arc::new(RecordingAudit::default());
        let enforcer = AccessEnforcer::new(audit.clone());
        let config = StorageConfig {
            upload_root: dir.path().to_string_lossy().into_owned(),
            max_upload_size_bytes: 1024,
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
            config.clone(),
            Arc::new(LoggingUploadNotifier),
        );

        Self {
            _dir: dir,
            db,
            stores,
            store,
            config,
            scanner,
            navigator,
            provisioner,
            archive,
            audit,
            cs: 1,
            math: 2,
        }
    }

    pub async fn user(
        &self,
        first: &str,
        last: &str,
        role: UserRole,
        department_id: Option<i64>,
    ) -> User {
        self.db.add_user(first, last, role, department_id).await
    }

    /// Year `2024-2025` with its first semester.
    pub async fn academic(&self) -> (AcademicYear, Semester) {
        let year = self.db.add_year("2024-2025").await;
        let semester = self.db.add_semester(year.id, SemesterType::First).await;
        (year, semester)
    }

    /// A course in the professor's department, assigned to them.
    pub async fn assign(
        &self,
        semester: &Semester,
        code: &str,
        name: &str,
        professor: &User,
    ) -> (Course, CourseAssignment) {
        let course = self.db.add_course(code, name, professor.department_id).await;
        let assignment = self
            .db
            .add_assignment(semester.id, course.id, professor.id)
            .await;
        (course, assignment)
    }
}
