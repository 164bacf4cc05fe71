//! Idempotent creation of professor, course, and document folders.

use std::sync::Arc;

use tracing::{debug, info};

use archive_auth::{AccessEnforcer, AccessPolicy};
use archive_core::error::AppError;
use archive_core::result::AppResult;
use archive_database::Stores;
use archive_entity::academic::{AcademicYear, Course, Semester};
use archive_entity::folder::{CreateFolder, Folder, FolderType};
use archive_entity::submission::DocumentType;
use archive_entity::user::User;
use archive_storage::PathResolver;

use crate::hierarchy::HierarchyPath;
use crate::hierarchy::navigator::title_case;
use crate::identity::{IdentityResolver, generate_professor_folder_name};

/// Creates folder rows and their directories.
///
/// Every operation may run concurrently with itself: rows are inserted
/// first and a unique-path conflict re-reads the winner.
#[derive(Debug, Clone)]
pub struct FolderProvisioner {
    /// Metadata stores.
    stores: Stores,
    /// Upload-root confinement.
    resolver: Arc<PathResolver>,
    /// Professor segment resolution.
    identity: IdentityResolver,
    /// Upload authorization.
    enforcer: AccessEnforcer,
}

impl FolderProvisioner {
    /// Creates a new provisioner.
    pub fn new(stores: Stores, resolver: Arc<PathResolver>, enforcer: AccessEnforcer) -> Self {
        let identity = IdentityResolver::new(stores.users.clone());
        Self {
            stores,
            resolver,
            identity,
            enforcer,
        }
    }

    /// Ensure the PROFESSOR_ROOT folder of a professor in a semester.
    pub async fn create_professor_folder(
        &self,
        professor_id: i64,
        academic_year_id: i64,
        semester_id: i64,
    ) -> AppResult<Folder> {
        let professor = self.find_user(professor_id).await?;
        if !professor.is_professor() {
            return Err(AppError::validation(format!(
                "User {professor_id} is not a professor"
            )));
        }
        let (year, semester) = self.find_term(academic_year_id, semester_id).await?;

        if let Some(existing) = self
            .stores
            .folders
            .find_professor_root(professor.id, year.id, semester.id)
            .await?
        {
            self.resolver.ensure_directory(&existing.path).await?;
            return Ok(existing);
        }

        let path = format!(
            "{}/{}/{}",
            year.year_code,
            semester.semester_type.as_segment(),
            generate_professor_folder_name(&professor)
        );
        self.resolver.ensure_directory(&path).await?;
        let folder = self
            .insert(CreateFolder {
                name: PathResolver::get_name(&path),
                path,
                folder_type: FolderType::ProfessorRoot,
                parent_id: None,
                owner_id: professor.id,
                academic_year_id: Some(year.id),
                semester_id: Some(semester.id),
                course_id: None,
            })
            .await?;
        info!(
            folder_id = folder.id,
            professor_id = professor.id,
            path = %folder.path,
            "Provisioned professor folder"
        );
        Ok(folder)
    }

    /// Ensure the course folder and its four standard subfolders.
    ///
    /// Returns `[course, Syllabus, Exams, Course Notes, Assignments]`.
    pub async fn create_course_folder_structure(
        &self,
        professor_id: i64,
        course_id: i64,
        academic_year_id: i64,
        semester_id: i64,
    ) -> AppResult<Vec<Folder>> {
        let root = self
            .create_professor_folder(professor_id, academic_year_id, semester_id)
            .await?;
        let course = self.find_course(course_id).await?;

        let course_folder = match self
            .stores
            .folders
            .find_course_folder(professor_id, course.id, semester_id)
            .await?
        {
            Some(existing) => {
                self.resolver.ensure_directory(&existing.path).await?;
                existing
            }
            None => {
                let path = format!("{}/{}", root.path, course.folder_name());
                match self.stores.folders.find_by_path(&path).await? {
                    Some(existing) => {
                        self.resolver.ensure_directory(&existing.path).await?;
                        existing
                    }
                    None => {
                        self.resolver.ensure_directory(&path).await?;
                        self.insert(CreateFolder {
                            name: course.folder_name(),
                            path,
                            folder_type: FolderType::Course,
                            parent_id: Some(root.id),
                            owner_id: professor_id,
                            academic_year_id: Some(academic_year_id),
                            semester_id: Some(semester_id),
                            course_id: Some(course.id),
                        })
                        .await?
                    }
                }
            }
        };

        let mut folders = Vec::with_capacity(1 + DocumentType::ALL.len());
        for doc_type in DocumentType::ALL {
            let child = self
                .ensure_child(&course_folder, doc_type.folder_name(), FolderType::Subfolder)
                .await?;
            folders.push(child);
        }
        folders.insert(0, course_folder);
        debug!(
            professor_id,
            course_code = %course.course_code,
            "Course folder structure ready"
        );
        Ok(folders)
    }

    /// The folder behind a five-level logical upload path, provisioning the
    /// structure on first use.
    ///
    /// The caller must be allowed to upload into the professor's folders.
    pub async fn get_or_create_folder_by_path(&self, path: &str, user: &User) -> AppResult<Folder> {
        let normalized = PathResolver::normalize_path(path);
        let parsed = HierarchyPath::parse(&normalized)?;
        let (Some(year_code), Some(semester_type), Some(segment), Some(code), Some(doc_segment)) = (
            parsed.year_code.as_deref(),
            parsed.semester,
            parsed.professor.as_deref(),
            parsed.course_code.as_deref(),
            parsed.document_type.as_deref(),
        ) else {
            return Err(AppError::invalid_path(format!(
                "Upload path must name every level down to the document type: '{path}'"
            )));
        };
        let policy = AccessPolicy::for_user(user);

        // Physical paths of existing document folders resolve directly.
        if let Some(existing) = self.stores.folders.find_by_path(&normalized).await? {
            let document_level = existing.course_id.is_some()
                && matches!(existing.folder_type, FolderType::Subfolder | FolderType::Custom);
            if document_level {
                self.enforcer.require_upload(&policy, existing.owner_id, path)?;
                return Ok(existing);
            }
        }

        let year = self
            .stores
            .academic
            .find_year_by_code(year_code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Academic year not found: {year_code}")))?;
        let semester = self
            .stores
            .academic
            .find_semester_by_type(year.id, semester_type)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Semester not found: {year_code}/{semester_type}"))
            })?;
        let professor = self.identity.resolve(segment).await?;
        let course = self
            .stores
            .academic
            .find_course_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course not found: {code}")))?;

        self.enforcer.require_upload(&policy, professor.id, path)?;

        let mut structure = self
            .create_course_folder_structure(professor.id, course.id, year.id, semester.id)
            .await?;
        let course_folder = structure.remove(0);

        match parsed.parsed_document_type() {
            Some(doc_type) => structure
                .into_iter()
                .find(|f| f.name == doc_type.folder_name())
                .ok_or_else(|| {
                    AppError::internal(format!("Missing {} folder after provisioning", doc_type))
                }),
            None => {
                self.ensure_child(&course_folder, &title_case(doc_segment), FolderType::Subfolder)
                    .await
            }
        }
    }

    /// Whether the professor's semester folder row exists.
    pub async fn professor_folder_exists(
        &self,
        professor_id: i64,
        academic_year_id: i64,
        semester_id: i64,
    ) -> AppResult<bool> {
        Ok(self
            .stores
            .folders
            .find_professor_root(professor_id, academic_year_id, semester_id)
            .await?
            .is_some())
    }

    /// Whether the professor's course folder row exists.
    pub async fn course_folder_exists(
        &self,
        professor_id: i64,
        course_id: i64,
        semester_id: i64,
    ) -> AppResult<bool> {
        Ok(self
            .stores
            .folders
            .find_course_folder(professor_id, course_id, semester_id)
            .await?
            .is_some())
    }

    /// The folder row at `path`, if any.
    pub async fn get_folder_by_path(&self, path: &str) -> AppResult<Option<Folder>> {
        self.stores
            .folders
            .find_by_path(&PathResolver::normalize_path(path))
            .await
    }

    /// Ensure a folder at `path`. Year, semester, and course links are
    /// inherited from the parent row when there is one.
    pub async fn create_folder_if_not_exists(
        &self,
        path: &str,
        owner_id: i64,
        folder_type: FolderType,
    ) -> AppResult<Folder> {
        let normalized = PathResolver::normalize_path(path);
        if normalized.is_empty() {
            return Err(AppError::invalid_path("Cannot create a folder at the upload root"));
        }
        if let Some(existing) = self.stores.folders.find_by_path(&normalized).await? {
            self.resolver.ensure_directory(&existing.path).await?;
            return Ok(existing);
        }

        let parent = self
            .stores
            .folders
            .find_by_path(&PathResolver::get_parent_path(&normalized))
            .await?;
        self.resolver.ensure_directory(&normalized).await?;
        self.insert(CreateFolder {
            name: PathResolver::get_name(&normalized),
            folder_type,
            parent_id: parent.as_ref().map(|p| p.id),
            owner_id,
            academic_year_id: parent.as_ref().and_then(|p| p.academic_year_id),
            semester_id: parent.as_ref().and_then(|p| p.semester_id),
            course_id: parent.as_ref().and_then(|p| p.course_id),
            path: normalized,
        })
        .await
    }

    async fn ensure_child(
        &self,
        parent: &Folder,
        name: &str,
        folder_type: FolderType,
    ) -> AppResult<Folder> {
        let path = format!("{}/{name}", parent.path);
        if let Some(existing) = self.stores.folders.find_by_path(&path).await? {
            self.resolver.ensure_directory(&existing.path).await?;
            return Ok(existing);
        }
        self.resolver.ensure_directory(&path).await?;
        self.insert(CreateFolder {
            path,
            name: name.to_string(),
            folder_type,
            parent_id: Some(parent.id),
            owner_id: parent.owner_id,
            academic_year_id: parent.academic_year_id,
            semester_id: parent.semester_id,
            course_id: parent.course_id,
        })
        .await
    }

    /// Insert a row; a concurrent insert of the same path wins and is
    /// returned instead.
    async fn insert(&self, data: CreateFolder) -> AppResult<Folder> {
        match self.stores.folders.create(&data).await {
            Ok(folder) => Ok(folder),
            Err(e) if e.is_conflict() => {
                debug!(path = %data.path, "Folder created concurrently, re-reading");
                self.stores.folders.find_by_path(&data.path).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn find_user(&self, id: i64) -> AppResult<User> {
        self.stores
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn find_course(&self, id: i64) -> AppResult<Course> {
        self.stores
            .academic
            .find_course(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {id} not found")))
    }

    async fn find_term(
        &self,
        academic_year_id: i64,
        semester_id: i64,
    ) -> AppResult<(AcademicYear, Semester)> {
        let year = self
            .stores
            .academic
            .find_year(academic_year_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Academic year {academic_year_id} not found"))
            })?;
        let semester = self
            .stores
            .academic
            .find_semester(semester_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Semester {semester_id} not found")))?;
        if semester.academic_year_id != year.id {
            return Err(AppError::validation(format!(
                "Semester {semester_id} does not belong to academic year {academic_year_id}"
            )));
        }
        Ok((year, semester))
    }
}
