//! In-memory store implementations.
//!
//! `MemoryDatabase` implements every store trait over plain vectors behind
//! one lock, with the same ordering and uniqueness rules as the PostgreSQL
//! schema. The service and worker crates test against it.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use archive_core::error::AppError;
use archive_core::result::AppResult;
use archive_entity::academic::{AcademicYear, Course, CourseAssignment, Semester, SemesterType};
use archive_entity::file::{CreateUploadedFile, UploadedFile};
use archive_entity::folder::{CreateFolder, Folder, FolderType};
use archive_entity::submission::{
    CreateSubmission, DocumentSubmission, DocumentType, SubmissionStatus,
};
use archive_entity::user::{User, UserRole};

use crate::store::{
    AcademicStore, FileStore, FolderStore, StoreTransaction, Stores, SubmissionStore,
    TransactionStore, UserStore,
};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    years: Vec<AcademicYear>,
    semesters: Vec<Semester>,
    courses: Vec<Course>,
    assignments: Vec<CourseAssignment>,
    users: Vec<User>,
    folders: Vec<Folder>,
    files: Vec<UploadedFile>,
    submissions: Vec<DocumentSubmission>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Mirrors `parent_id ON DELETE CASCADE` and `folder_id ON DELETE SET NULL`.
    fn delete_folder(&mut self, id: i64) {
        let mut doomed = vec![id];
        let mut next = 0;
        while next < doomed.len() {
            let parent = doomed[next];
            doomed.extend(
                self.folders
                    .iter()
                    .filter(|f| f.parent_id == Some(parent))
                    .map(|f| f.id),
            );
            next += 1;
        }
        self.folders.retain(|f| !doomed.contains(&f.id));
        for file in &mut self.files {
            if file.folder_id.is_some_and(|folder| doomed.contains(&folder)) {
                file.folder_id = None;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PendingDelete {
    Folder(i64),
    File(i64),
}

/// Buffers deletions and applies them under one write lock on commit.
struct MemoryTransaction {
    db: Arc<MemoryDatabase>,
    pending: Vec<PendingDelete>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn delete_folder(&mut self, id: i64) -> AppResult<()> {
        self.pending.push(PendingDelete::Folder(id));
        Ok(())
    }

    async fn delete_file(&mut self, id: i64) -> AppResult<()> {
        self.pending.push(PendingDelete::File(id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut state = self.db.state.write().await;
        for pending in &self.pending {
            match *pending {
                PendingDelete::Folder(id) => state.delete_folder(id),
                PendingDelete::File(id) => state.files.retain(|f| f.id != id),
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryTransactions {
    db: Arc<MemoryDatabase>,
}

#[async_trait]
impl TransactionStore for MemoryTransactions {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemoryTransaction {
            db: Arc::clone(&self.db),
            pending: Vec::new(),
        }))
    }
}

/// Process-local database backing all store traits.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    state: RwLock<State>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store handles backed by this database.
    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            academic: self.clone(),
            users: self.clone(),
            folders: self.clone(),
            files: self.clone(),
            submissions: self.clone(),
            transactions: Arc::new(MemoryTransactions { db: self.clone() }),
        }
    }

    /// Insert an active academic year.
    pub async fn add_year(&self, year_code: &str) -> AcademicYear {
        let mut state = self.state.write().await;
        let year = AcademicYear {
            id: state.next_id(),
            year_code: year_code.to_string(),
            is_active: true,
        };
        state.years.push(year.clone());
        year
    }

    /// Insert an inactive academic year.
    pub async fn add_inactive_year(&self, year_code: &str) -> AcademicYear {
        let mut state = self.state.write().await;
        let year = AcademicYear {
            id: state.next_id(),
            year_code: year_code.to_string(),
            is_active: false,
        };
        state.years.push(year.clone());
        year
    }

    /// Insert an active semester.
    pub async fn add_semester(
        &self,
        academic_year_id: i64,
        semester_type: SemesterType,
    ) -> Semester {
        let mut state = self.state.write().await;
        let semester = Semester {
            id: state.next_id(),
            academic_year_id,
            semester_type,
            is_active: true,
        };
        state.semesters.push(semester.clone());
        semester
    }

    /// Insert a course.
    pub async fn add_course(
        &self,
        course_code: &str,
        course_name: &str,
        department_id: Option<i64>,
    ) -> Course {
        let mut state = self.state.write().await;
        let course = Course {
            id: state.next_id(),
            course_code: course_code.to_string(),
            course_name: course_name.to_string(),
            department_id,
        };
        state.courses.push(course.clone());
        course
    }

    /// Insert an active course assignment.
    pub async fn add_assignment(
        &self,
        semester_id: i64,
        course_id: i64,
        professor_id: i64,
    ) -> CourseAssignment {
        let mut state = self.state.write().await;
        let assignment = CourseAssignment {
            id: state.next_id(),
            semester_id,
            course_id,
            professor_id,
            is_active: true,
        };
        state.assignments.push(assignment.clone());
        assignment
    }

    /// Insert an active user.
    pub async fn add_user(
        &self,
        first_name: &str,
        last_name: &str,
        role: UserRole,
        department_id: Option<i64>,
    ) -> User {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let user = User {
            id,
            email: format!("user{id}@archive.test"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            department_id,
            professor_id: None,
            is_active: true,
        };
        state.users.push(user.clone());
        user
    }

    /// Set the legacy professor tag of a user.
    pub async fn set_professor_tag(&self, user_id: i64, tag: &str) {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.professor_id = Some(tag.to_string());
        }
    }
}

#[async_trait]
impl AcademicStore for MemoryDatabase {
    async fn find_year(&self, id: i64) -> AppResult<Option<AcademicYear>> {
        let state = self.state.read().await;
        Ok(state.years.iter().find(|y| y.id == id).cloned())
    }

    async fn find_year_by_code(&self, year_code: &str) -> AppResult<Option<AcademicYear>> {
        let state = self.state.read().await;
        Ok(state.years.iter().find(|y| y.year_code == year_code).cloned())
    }

    async fn list_active_years(&self) -> AppResult<Vec<AcademicYear>> {
        let state = self.state.read().await;
        let mut years: Vec<_> = state.years.iter().filter(|y| y.is_active).cloned().collect();
        years.sort_by(|a, b| b.year_code.cmp(&a.year_code));
        Ok(years)
    }

    async fn find_semester(&self, id: i64) -> AppResult<Option<Semester>> {
        let state = self.state.read().await;
        Ok(state.semesters.iter().find(|s| s.id == id).cloned())
    }

    async fn find_semester_by_type(
        &self,
        academic_year_id: i64,
        semester_type: SemesterType,
    ) -> AppResult<Option<Semester>> {
        let state = self.state.read().await;
        Ok(state
            .semesters
            .iter()
            .find(|s| s.academic_year_id == academic_year_id && s.semester_type == semester_type)
            .cloned())
    }

    async fn list_semesters(&self, academic_year_id: i64) -> AppResult<Vec<Semester>> {
        let state = self.state.read().await;
        let mut semesters: Vec<_> = state
            .semesters
            .iter()
            .filter(|s| s.academic_year_id == academic_year_id)
            .cloned()
            .collect();
        semesters.sort_by_key(|s| s.semester_type);
        Ok(semesters)
    }

    async fn find_course(&self, id: i64) -> AppResult<Option<Course>> {
        let state = self.state.read().await;
        Ok(state.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_course_by_code(&self, course_code: &str) -> AppResult<Option<Course>> {
        let state = self.state.read().await;
        Ok(state
            .courses
            .iter()
            .find(|c| c.course_code == course_code)
            .cloned())
    }

    async fn find_assignment(&self, id: i64) -> AppResult<Option<CourseAssignment>> {
        let state = self.state.read().await;
        Ok(state.assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_assignment_for(
        &self,
        semester_id: i64,
        course_id: i64,
        professor_id: i64,
    ) -> AppResult<Option<CourseAssignment>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .iter()
            .find(|a| {
                a.semester_id == semester_id
                    && a.course_id == course_id
                    && a.professor_id == professor_id
            })
            .cloned())
    }

    async fn list_assignments(
        &self,
        semester_id: i64,
        professor_id: i64,
    ) -> AppResult<Vec<CourseAssignment>> {
        let state = self.state.read().await;
        let course_name = |course_id: i64| {
            state
                .courses
                .iter()
                .find(|c| c.id == course_id)
                .map(|c| c.course_name.clone())
                .unwrap_or_default()
        };
        let mut assignments: Vec<_> = state
            .assignments
            .iter()
            .filter(|a| {
                a.semester_id == semester_id && a.professor_id == professor_id && a.is_active
            })
            .cloned()
            .collect();
        assignments.sort_by_key(|a| course_name(a.course_id));
        Ok(assignments)
    }
}

#[async_trait]
impl UserStore for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_professor_tag(&self, tag: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.professor_id.as_deref() == Some(tag))
            .cloned())
    }

    async fn list_professors(&self, department_id: Option<i64>) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<_> = state
            .users
            .iter()
            .filter(|u| u.role == UserRole::Professor && u.is_active)
            .filter(|u| department_id.is_none() || u.department_id == department_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            (&a.first_name, &a.last_name, a.id).cmp(&(&b.first_name, &b.last_name, b.id))
        });
        Ok(users)
    }
}

#[async_trait]
impl FolderStore for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state.folders.iter().find(|f| f.id == id).cloned())
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state.folders.iter().find(|f| f.path == path).cloned())
    }

    async fn find_professor_root(
        &self,
        owner_id: i64,
        academic_year_id: i64,
        semester_id: i64,
    ) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .iter()
            .find(|f| {
                f.folder_type == FolderType::ProfessorRoot
                    && f.owner_id == owner_id
                    && f.academic_year_id == Some(academic_year_id)
                    && f.semester_id == Some(semester_id)
            })
            .cloned())
    }

    async fn find_course_folder(
        &self,
        owner_id: i64,
        course_id: i64,
        semester_id: i64,
    ) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .iter()
            .find(|f| {
                f.folder_type == FolderType::Course
                    && f.owner_id == owner_id
                    && f.course_id == Some(course_id)
                    && f.semester_id == Some(semester_id)
            })
            .cloned())
    }

    async fn list_children(&self, parent_id: i64) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut children: Vec<_> = state
            .folders
            .iter()
            .filter(|f| f.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn list_all(&self) -> AppResult<Vec<Folder>> {
        Ok(self.state.read().await.folders.clone())
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;
        if state.folders.iter().any(|f| f.path == data.path) {
            return Err(AppError::conflict(format!(
                "Folder path '{}' already exists",
                data.path
            )));
        }
        let now = Utc::now();
        let folder = Folder {
            id: state.next_id(),
            path: data.path.clone(),
            name: data.name.clone(),
            folder_type: data.folder_type,
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            academic_year_id: data.academic_year_id,
            semester_id: data.semester_id,
            course_id: data.course_id,
            created_at: now,
            updated_at: now,
        };
        state.folders.push(folder.clone());
        Ok(folder)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.state.write().await.delete_folder(id);
        Ok(())
    }
}

#[async_trait]
impl FileStore for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UploadedFile>> {
        let state = self.state.read().await;
        Ok(state.files.iter().find(|f| f.id == id).cloned())
    }

    async fn find_by_file_url(&self, file_url: &str) -> AppResult<Option<UploadedFile>> {
        let state = self.state.read().await;
        Ok(state.files.iter().find(|f| f.file_url == file_url).cloned())
    }

    async fn find_by_stored_filename(&self, stored: &str) -> AppResult<Option<UploadedFile>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .iter()
            .find(|f| f.stored_filename.as_deref() == Some(stored))
            .cloned())
    }

    async fn list_by_submission(&self, submission_id: i64) -> AppResult<Vec<UploadedFile>> {
        let state = self.state.read().await;
        let mut files: Vec<_> = state
            .files
            .iter()
            .filter(|f| f.document_submission_id == Some(submission_id))
            .cloned()
            .collect();
        files.sort_by_key(|f| {
            (
                f.file_order.is_none(),
                Reverse(f.file_order),
                Reverse(f.created_at),
                Reverse(f.id),
            )
        });
        Ok(files)
    }

    async fn list_all(&self) -> AppResult<Vec<UploadedFile>> {
        Ok(self.state.read().await.files.clone())
    }

    async fn create(&self, data: &CreateUploadedFile) -> AppResult<UploadedFile> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let file = UploadedFile {
            id: state.next_id(),
            original_filename: data.original_filename.clone(),
            stored_filename: Some(data.stored_filename.clone()),
            file_url: data.file_url.clone(),
            file_size: Some(data.file_size),
            file_type: data.file_type.clone(),
            uploader_id: Some(data.uploader_id),
            document_submission_id: data.document_submission_id,
            folder_id: data.folder_id,
            file_order: data.file_order,
            notes: data.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        state.files.push(file.clone());
        Ok(file)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.state.write().await.files.retain(|f| f.id != id);
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<DocumentSubmission>> {
        let state = self.state.read().await;
        Ok(state.submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn find_for(
        &self,
        course_assignment_id: i64,
        document_type: DocumentType,
    ) -> AppResult<Option<DocumentSubmission>> {
        let state = self.state.read().await;
        Ok(state
            .submissions
            .iter()
            .find(|s| {
                s.course_assignment_id == course_assignment_id && s.document_type == document_type
            })
            .cloned())
    }

    async fn list_by_assignment(
        &self,
        course_assignment_id: i64,
    ) -> AppResult<Vec<DocumentSubmission>> {
        let state = self.state.read().await;
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.course_assignment_id == course_assignment_id)
            .cloned()
            .collect())
    }

    async fn create(&self, data: &CreateSubmission) -> AppResult<DocumentSubmission> {
        let mut state = self.state.write().await;
        if state.submissions.iter().any(|s| {
            s.course_assignment_id == data.course_assignment_id
                && s.document_type == data.document_type
        }) {
            return Err(AppError::conflict(format!(
                "Submission for assignment {} and type {} already exists",
                data.course_assignment_id,
                data.document_type.url_segment()
            )));
        }
        let submission = DocumentSubmission {
            id: state.next_id(),
            course_assignment_id: data.course_assignment_id,
            document_type: data.document_type,
            professor_id: data.professor_id,
            file_count: 0,
            total_file_size: 0,
            submitted_at: Utc::now(),
            is_late_submission: false,
            status: SubmissionStatus::NotUploaded,
            notes: None,
        };
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn update_statistics(
        &self,
        id: i64,
        file_count: i32,
        total_file_size: i64,
        status: SubmissionStatus,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let submission = state
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found(format!("Submission {id} not found")))?;
        submission.file_count = file_count;
        submission.total_file_size = total_file_size;
        submission.status = status;
        Ok(())
    }
}
