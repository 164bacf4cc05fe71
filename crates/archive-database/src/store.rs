//! Store traits consumed by the service layer.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`] and
//! an in-memory implementation in [`crate::memory`].

use std::sync::Arc;

use async_trait::async_trait;

use archive_core::result::AppResult;
use archive_entity::academic::{AcademicYear, Course, CourseAssignment, Semester, SemesterType};
use archive_entity::file::{CreateUploadedFile, UploadedFile};
use archive_entity::folder::{CreateFolder, Folder};
use archive_entity::submission::{
    CreateSubmission, DocumentSubmission, DocumentType, SubmissionStatus,
};
use archive_entity::user::User;

/// Years, semesters, courses, and course assignments.
#[async_trait]
pub trait AcademicStore: Send + Sync + 'static {
    /// Find a year by id.
    async fn find_year(&self, id: i64) -> AppResult<Option<AcademicYear>>;

    /// Find a year by its unique code.
    async fn find_year_by_code(&self, year_code: &str) -> AppResult<Option<AcademicYear>>;

    /// Active years, newest code first.
    async fn list_active_years(&self) -> AppResult<Vec<AcademicYear>>;

    /// Find a semester by id.
    async fn find_semester(&self, id: i64) -> AppResult<Option<Semester>>;

    /// Find the semester of the given type within a year.
    async fn find_semester_by_type(
        &self,
        academic_year_id: i64,
        semester_type: SemesterType,
    ) -> AppResult<Option<Semester>>;

    /// Semesters of a year, ordered FIRST, SECOND, SUMMER.
    async fn list_semesters(&self, academic_year_id: i64) -> AppResult<Vec<Semester>>;

    /// Find a course by id.
    async fn find_course(&self, id: i64) -> AppResult<Option<Course>>;

    /// Find a course by its unique code.
    async fn find_course_by_code(&self, course_code: &str) -> AppResult<Option<Course>>;

    /// Find an assignment by id.
    async fn find_assignment(&self, id: i64) -> AppResult<Option<CourseAssignment>>;

    /// Find the assignment binding a course to a professor in a semester.
    async fn find_assignment_for(
        &self,
        semester_id: i64,
        course_id: i64,
        professor_id: i64,
    ) -> AppResult<Option<CourseAssignment>>;

    /// Active assignments of a professor in a semester, ordered by course name.
    async fn list_assignments(
        &self,
        semester_id: i64,
        professor_id: i64,
    ) -> AppResult<Vec<CourseAssignment>>;
}

/// User lookups.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find a user by the legacy external professor tag.
    async fn find_by_professor_tag(&self, tag: &str) -> AppResult<Option<User>>;

    /// Active professors, optionally restricted to a department, ordered by
    /// first name then last name.
    async fn list_professors(&self, department_id: Option<i64>) -> AppResult<Vec<User>>;
}

/// Folder rows.
#[async_trait]
pub trait FolderStore: Send + Sync + 'static {
    /// Find a folder by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Folder>>;

    /// Find a folder by its unique path.
    async fn find_by_path(&self, path: &str) -> AppResult<Option<Folder>>;

    /// Find the professor root for `(owner, year, semester)`.
    async fn find_professor_root(
        &self,
        owner_id: i64,
        academic_year_id: i64,
        semester_id: i64,
    ) -> AppResult<Option<Folder>>;

    /// Find the course folder for `(owner, course, semester)`.
    async fn find_course_folder(
        &self,
        owner_id: i64,
        course_id: i64,
        semester_id: i64,
    ) -> AppResult<Option<Folder>>;

    /// Direct children of a folder, ordered by name.
    async fn list_children(&self, parent_id: i64) -> AppResult<Vec<Folder>>;

    /// Every folder row.
    async fn list_all(&self) -> AppResult<Vec<Folder>>;

    /// Insert a folder. Fails with `Conflict` when the path is taken.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Delete a folder row. Descendant folders are deleted with it and the
    /// files it contained keep their rows without a folder.
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Uploaded file rows.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// Find a file by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UploadedFile>>;

    /// Find a file by its root-relative physical path.
    async fn find_by_file_url(&self, file_url: &str) -> AppResult<Option<UploadedFile>>;

    /// Find a file by its name on disk.
    async fn find_by_stored_filename(&self, stored: &str) -> AppResult<Option<UploadedFile>>;

    /// Files of a submission, newest `file_order` first, then newest upload.
    async fn list_by_submission(&self, submission_id: i64) -> AppResult<Vec<UploadedFile>>;

    /// Every file row.
    async fn list_all(&self) -> AppResult<Vec<UploadedFile>>;

    /// Insert a file row.
    async fn create(&self, data: &CreateUploadedFile) -> AppResult<UploadedFile>;

    /// Delete a file row.
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Document submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync + 'static {
    /// Find a submission by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<DocumentSubmission>>;

    /// Find the submission of a document type within an assignment.
    async fn find_for(
        &self,
        course_assignment_id: i64,
        document_type: DocumentType,
    ) -> AppResult<Option<DocumentSubmission>>;

    /// All submissions of an assignment.
    async fn list_by_assignment(
        &self,
        course_assignment_id: i64,
    ) -> AppResult<Vec<DocumentSubmission>>;

    /// Insert a submission with no files. Fails with `Conflict` when one
    /// already exists for the assignment and type.
    async fn create(&self, data: &CreateSubmission) -> AppResult<DocumentSubmission>;

    /// Overwrite the derived statistics.
    async fn update_statistics(
        &self,
        id: i64,
        file_count: i32,
        total_file_size: i64,
        status: SubmissionStatus,
    ) -> AppResult<()>;
}

/// Row deletions that become visible together on commit. Dropping the
/// transaction without committing discards them.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Delete a folder row. Descendant folders are deleted with it and the
    /// files it contained keep their rows without a folder.
    async fn delete_folder(&mut self, id: i64) -> AppResult<()>;

    /// Delete a file row.
    async fn delete_file(&mut self, id: i64) -> AppResult<()>;

    /// Apply every deletion.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Opens store transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync + 'static {
    /// Begin a transaction.
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;
}

/// Shared handles to every store.
#[derive(Clone)]
pub struct Stores {
    /// Academic reference data.
    pub academic: Arc<dyn AcademicStore>,
    /// Users.
    pub users: Arc<dyn UserStore>,
    /// Folders.
    pub folders: Arc<dyn FolderStore>,
    /// Uploaded files.
    pub files: Arc<dyn FileStore>,
    /// Submissions.
    pub submissions: Arc<dyn SubmissionStore>,
    /// Multi-row write transactions.
    pub transactions: Arc<dyn TransactionStore>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
