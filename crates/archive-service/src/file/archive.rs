//! Storing, reading, and deleting archived files.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use archive_auth::{AccessEnforcer, FileOwner};
use archive_core::config::StorageConfig;
use archive_core::error::AppError;
use archive_core::result::AppResult;
use archive_database::Stores;
use archive_entity::file::{CreateUploadedFile, UploadedFile};
use archive_entity::folder::{Folder, FolderType};
use archive_entity::submission::{
    CreateSubmission, DocumentSubmission, DocumentType, SubmissionStatus,
};
use archive_entity::user::User;
use archive_storage::mime::{extension_of, mime_from_extension};
use archive_storage::{LocalStore, PathResolver};

use super::notifier::UploadNotifier;
use crate::context::RequestContext;
use crate::provisioning::FolderProvisioner;
use crate::scanner::FilesystemScanner;

/// Upload, download, and delete flows over the archive.
#[derive(Clone)]
pub struct FileArchiveService {
    /// Metadata stores.
    stores: Stores,
    /// File bytes.
    store: LocalStore,
    /// Target folder provisioning.
    provisioner: FolderProvisioner,
    /// Listing cache owner.
    scanner: FilesystemScanner,
    /// Audited permission checks.
    enforcer: AccessEnforcer,
    /// Upload limits.
    config: StorageConfig,
    /// Upload event sink.
    notifier: Arc<dyn UploadNotifier>,
}

impl std::fmt::Debug for FileArchiveService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileArchiveService").finish_non_exhaustive()
    }
}

impl FileArchiveService {
    /// Creates a new archive service.
    pub fn new(
        stores: Stores,
        store: LocalStore,
        provisioner: FolderProvisioner,
        scanner: FilesystemScanner,
        enforcer: AccessEnforcer,
        config: StorageConfig,
        notifier: Arc<dyn UploadNotifier>,
    ) -> Self {
        Self {
            stores,
            store,
            provisioner,
            scanner,
            enforcer,
            config,
            notifier,
        }
    }

    /// Store an upload under the logical or physical folder `path`.
    ///
    /// The folder structure is provisioned on demand. Files landing in a
    /// standard document folder are attached to the assignment's submission
    /// for that type, and the submission statistics are recomputed.
    pub async fn store_file(
        &self,
        ctx: &RequestContext,
        path: &str,
        original_filename: &str,
        data: Bytes,
        notes: Option<String>,
    ) -> AppResult<UploadedFile> {
        let extension = self.validate_upload(original_filename, &data)?;

        let folder = self
            .provisioner
            .get_or_create_folder_by_path(path, &ctx.user)
            .await?;
        self.enforcer
            .require_upload(&ctx.policy(), folder.owner_id, &folder.path)?;

        let submission = self.submission_for(&folder).await?;
        let file_order = match &submission {
            Some(s) => Some(self.next_file_order(s.id).await?),
            None => None,
        };

        let stored_filename = format!("{}.{extension}", Uuid::new_v4());
        let file_url = format!("{}/{stored_filename}", folder.path);
        let size = data.len() as i64;
        self.store.write(&file_url, data).await?;

        let record = CreateUploadedFile {
            original_filename: original_filename.trim().to_string(),
            stored_filename,
            file_url: file_url.clone(),
            file_size: size,
            file_type: Some(mime_from_extension(&extension).to_string()),
            uploader_id: ctx.user_id(),
            document_submission_id: submission.as_ref().map(|s| s.id),
            folder_id: Some(folder.id),
            file_order,
            notes,
        };
        let file = match self.stores.files.create(&record).await {
            Ok(file) => file,
            Err(e) => {
                self.discard(&file_url).await;
                return Err(e);
            }
        };

        if let Some(submission) = &submission {
            self.recompute_statistics(submission.id).await?;
        }
        self.scanner.invalidate_cache_recursive(&folder.path);

        info!(
            file_id = file.id,
            user_id = ctx.user_id(),
            folder = %folder.path,
            size,
            "Stored archive file"
        );

        if let Err(e) = self.notifier.notify_upload(&ctx.user, &file, &folder).await {
            warn!(file_id = file.id, error = %e, "Upload notification failed");
        }
        Ok(file)
    }

    /// A file row and its bytes. Readers outside the owner's department
    /// are refused unless they have admin-level access.
    pub async fn read_file(
        &self,
        ctx: &RequestContext,
        file_id: i64,
    ) -> AppResult<(UploadedFile, Bytes)> {
        let file = self.find_file(file_id).await?;
        let owners = self.file_owners(std::slice::from_ref(&file)).await?;
        let owner = owners.get(&file.id).copied().unwrap_or_default();
        let policy = ctx.policy();
        self.enforcer.require(
            &policy,
            policy.can_access_file(owner.department_id),
            &file.file_url,
            "file belongs to another department",
        )?;
        let data = self.store.read_bytes(&file.file_url).await?;
        Ok((file, data))
    }

    /// Delete a file row and, best-effort, its bytes.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: i64) -> AppResult<()> {
        let file = self.find_file(file_id).await?;
        let submission = match file.document_submission_id {
            Some(id) => self.stores.submissions.find_by_id(id).await?,
            None => None,
        };
        let owner = file
            .uploader_id
            .or(submission.as_ref().map(|s| s.professor_id));

        let policy = ctx.policy();
        match owner {
            Some(owner_id) => self
                .enforcer
                .require_delete(&policy, owner_id, &file.file_url)?,
            None => self
                .enforcer
                .require(&policy, false, &file.file_url, "file has no owner")?,
        }

        self.stores.files.delete(file.id).await?;
        if let Some(submission) = &submission {
            self.recompute_statistics(submission.id).await?;
        }

        match self.store.delete(&file.file_url).await {
            Ok(true) => {}
            Ok(false) => warn!(
                file_id,
                path = %file.file_url,
                "Deleted file had no bytes on disk"
            ),
            Err(e) => warn!(
                file_id,
                path = %file.file_url,
                error = %e,
                "Failed to delete file bytes"
            ),
        }
        self.scanner
            .invalidate_cache_recursive(&PathResolver::get_parent_path(&file.file_url));

        info!(file_id, user_id = ctx.user_id(), "Deleted archive file");
        Ok(())
    }

    /// Every file the caller may read.
    pub async fn accessible_files(&self, ctx: &RequestContext) -> AppResult<Vec<UploadedFile>> {
        let files = self.stores.files.list_all().await?;
        let owners = self.file_owners(&files).await?;
        Ok(self
            .enforcer
            .filter_accessible_files(&ctx.policy(), files, |f| {
                owners.get(&f.id).copied().unwrap_or_default()
            }))
    }

    /// Files uploaded by members of `department_id`, or all files for `None`.
    /// Only admin-level callers get results.
    pub async fn department_files(
        &self,
        ctx: &RequestContext,
        department_id: Option<i64>,
    ) -> AppResult<Vec<UploadedFile>> {
        let files = self.stores.files.list_all().await?;
        let owners = self.file_owners(&files).await?;
        Ok(self
            .enforcer
            .filter_by_department(&ctx.policy(), files, department_id, |f| {
                owners.get(&f.id).copied().unwrap_or_default()
            }))
    }

    fn validate_upload(&self, original_filename: &str, data: &Bytes) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::file_validation("File is empty"));
        }
        if original_filename.trim().is_empty() {
            return Err(AppError::file_validation("File name is required"));
        }
        let extension = extension_of(original_filename.trim());
        if extension.is_empty() || !self.config.is_extension_allowed(&extension) {
            return Err(AppError::file_validation(format!(
                "File type not allowed: '{original_filename}'"
            )));
        }
        if data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::file_validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        Ok(extension)
    }

    /// The submission a folder's uploads count toward, created on first use.
    async fn submission_for(&self, folder: &Folder) -> AppResult<Option<DocumentSubmission>> {
        if folder.folder_type != FolderType::Subfolder {
            return Ok(None);
        }
        let (Some(course_id), Some(semester_id), Some(document_type)) = (
            folder.course_id,
            folder.semester_id,
            DocumentType::from_folder_name(&folder.name),
        ) else {
            return Ok(None);
        };
        let Some(assignment) = self
            .stores
            .academic
            .find_assignment_for(semester_id, course_id, folder.owner_id)
            .await?
        else {
            return Ok(None);
        };

        if let Some(existing) = self
            .stores
            .submissions
            .find_for(assignment.id, document_type)
            .await?
        {
            return Ok(Some(existing));
        }
        let data = CreateSubmission {
            course_assignment_id: assignment.id,
            document_type,
            professor_id: assignment.professor_id,
        };
        match self.stores.submissions.create(&data).await {
            Ok(created) => Ok(Some(created)),
            Err(e) if e.is_conflict() => self
                .stores
                .submissions
                .find_for(assignment.id, document_type)
                .await?
                .map(Some)
                .ok_or(e),
            Err(e) => Err(e),
        }
    }

    async fn recompute_statistics(&self, submission_id: i64) -> AppResult<()> {
        let files = self.stores.files.list_by_submission(submission_id).await?;
        let count = files.len() as i32;
        let total: i64 = files.iter().filter_map(|f| f.file_size).sum();
        let status = if count > 0 {
            SubmissionStatus::Uploaded
        } else {
            SubmissionStatus::NotUploaded
        };
        self.stores
            .submissions
            .update_statistics(submission_id, count, total, status)
            .await
    }

    /// One past the highest order in the submission, so orders are never
    /// reused after a delete.
    async fn next_file_order(&self, submission_id: i64) -> AppResult<i32> {
        let files = self.stores.files.list_by_submission(submission_id).await?;
        let highest = files.iter().filter_map(|f| f.file_order).max().unwrap_or(0);
        Ok(highest.max(files.len() as i32) + 1)
    }

    async fn find_file(&self, file_id: i64) -> AppResult<UploadedFile> {
        self.stores
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Owner of each file by file id: the uploader, or the submission's
    /// professor when the uploader is unset or no longer exists.
    async fn file_owners(&self, files: &[UploadedFile]) -> AppResult<HashMap<i64, FileOwner>> {
        let mut users: HashMap<i64, Option<User>> = HashMap::new();
        let mut professors: HashMap<i64, Option<i64>> = HashMap::new();
        let mut owners = HashMap::new();
        for file in files {
            let mut owner = match file.uploader_id {
                Some(id) => self.cached_user(&mut users, id).await?,
                None => None,
            };
            if owner.is_none() {
                if let Some(submission_id) = file.document_submission_id {
                    let professor_id = match professors.get(&submission_id) {
                        Some(cached) => *cached,
                        None => {
                            let found = self
                                .stores
                                .submissions
                                .find_by_id(submission_id)
                                .await?
                                .map(|s| s.professor_id);
                            professors.insert(submission_id, found);
                            found
                        }
                    };
                    if let Some(professor_id) = professor_id {
                        owner = self.cached_user(&mut users, professor_id).await?;
                    }
                }
            }
            let owner = owner
                .map(|u| FileOwner {
                    user_id: Some(u.id),
                    department_id: u.department_id,
                })
                .unwrap_or_default();
            owners.insert(file.id, owner);
        }
        Ok(owners)
    }

    async fn cached_user(
        &self,
        users: &mut HashMap<i64, Option<User>>,
        id: i64,
    ) -> AppResult<Option<User>> {
        if let Some(cached) = users.get(&id) {
            return Ok(cached.clone());
        }
        let user = self.stores.users.find_by_id(id).await?;
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn discard(&self, file_url: &str) {
        if let Err(e) = self.store.delete(file_url).await {
            warn!(path = %file_url, error = %e, "Failed to remove bytes of a rejected upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use archive_core::error::ErrorKind;
    use archive_entity::user::UserRole;

    use super::*;
    use crate::testing::Fixture;

    const SYLLABUS: &str = "/2024-2025/first/John Doe/CS101/syllabus";

    #[tokio::test]
    async fn test_upload_validation() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let ctx = RequestContext::new(john);

        for (name, data) in [
            ("a.pdf", Bytes::new()),
            ("  ", Bytes::from("x")),
            ("virus.exe", Bytes::from("x")),
            ("noextension", Bytes::from("x")),
        ] {
            let err = fx
                .archive
                .store_file(&ctx, SYLLABUS, name, data, None)
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::FileValidation, "{name}");
        }

        let big = Bytes::from(vec![0u8; fx.config.max_upload_size_bytes as usize + 1]);
        let err = fx
            .archive
            .store_file(&ctx, SYLLABUS, "big.pdf", big, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileValidation);
        assert!(fx.stores.folders.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_file_updates_submission_and_cache() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        let (_, assignment) = fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let ctx = RequestContext::new(john.clone());

        let folder_path = "2024-2025/first/John Doe/CS101 - Algorithms/Syllabus";
        fx.provisioner
            .get_or_create_folder_by_path(SYLLABUS, &john)
            .await
            .unwrap();
        let before = fx
            .scanner
            .list_directory(folder_path, &john, 1, 10, None, None)
            .await
            .unwrap();
        assert_eq!(before.total_items, 0);

        let first = fx
            .archive
            .store_file(&ctx, SYLLABUS, "Outline.PDF", Bytes::from("hello"), None)
            .await
            .unwrap();
        let second = fx
            .archive
            .store_file(&ctx, folder_path, "notes.txt", Bytes::from("abc"), None)
            .await
            .unwrap();
        assert!(first.file_url.starts_with(folder_path));
        assert!(first.stored_filename.as_deref().unwrap().ends_with(".pdf"));
        assert_eq!(first.file_type.as_deref(), Some("application/pdf"));
        assert_eq!(first.document_submission_id, second.document_submission_id);
        assert_eq!(second.file_order, Some(2));

        let submission = fx
            .stores
            .submissions
            .find_for(assignment.id, DocumentType::Syllabus)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.file_count, 2);
        assert_eq!(submission.total_file_size, 8);
        assert_eq!(submission.status, SubmissionStatus::Uploaded);

        // The cached empty listing was invalidated by the upload.
        let after = fx
            .scanner
            .list_directory(folder_path, &john, 1, 10, None, None)
            .await
            .unwrap();
        assert_eq!(after.total_items, 2);
        assert_eq!(
            fx.store.read_bytes(&first.file_url).await.unwrap(),
            Bytes::from("hello")
        );
    }

    #[tokio::test]
    async fn test_department_read_access() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let ctx = RequestContext::new(john.clone());
        let file = fx
            .archive
            .store_file(&ctx, SYLLABUS, "a.pdf", Bytes::from("x"), None)
            .await
            .unwrap();

        let hod = fx.user("Hana", "Head", UserRole::Hod, Some(fx.cs)).await;
        let (read, data) = fx
            .archive
            .read_file(&RequestContext::new(hod.clone()), file.id)
            .await
            .unwrap();
        assert_eq!(read.id, file.id);
        assert_eq!(data, Bytes::from("x"));

        let mona = fx.user("Mona", "Math", UserRole::Professor, Some(fx.math)).await;
        let err = fx
            .archive
            .read_file(&RequestContext::new(mona.clone()), file.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let dean = fx.user("Dee", "Dean", UserRole::Deanship, None).await;
        let dean_ctx = RequestContext::new(dean);
        assert!(fx.archive.read_file(&dean_ctx, file.id).await.is_ok());

        let hod_ctx = RequestContext::new(hod);
        let visible = fx.archive.accessible_files(&hod_ctx).await.unwrap();
        assert_eq!(visible.len(), 1);
        let mona_ctx = RequestContext::new(mona);
        assert!(fx.archive.accessible_files(&mona_ctx).await.unwrap().is_empty());
        let cs_files = fx.archive.department_files(&dean_ctx, Some(fx.cs)).await.unwrap();
        assert_eq!(cs_files.len(), 1);
        assert!(fx.archive.department_files(&dean_ctx, Some(fx.math)).await.unwrap().is_empty());
        assert!(fx
            .archive
            .department_files(&hod_ctx, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_owner_falls_back_to_submission_professor() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let ctx = RequestContext::new(john.clone());
        let file = fx
            .archive
            .store_file(&ctx, SYLLABUS, "a.pdf", Bytes::from("x"), None)
            .await
            .unwrap();

        // Imported row whose uploader account no longer exists.
        let url = format!("{}/legacy.pdf", PathResolver::get_parent_path(&file.file_url));
        fx.store.write(&url, Bytes::from("old")).await.unwrap();
        let legacy = fx
            .stores
            .files
            .create(&CreateUploadedFile {
                original_filename: "legacy.pdf".into(),
                stored_filename: "legacy.pdf".into(),
                file_url: url,
                file_size: 3,
                file_type: None,
                uploader_id: 9999,
                document_submission_id: file.document_submission_id,
                folder_id: file.folder_id,
                file_order: Some(2),
                notes: None,
            })
            .await
            .unwrap();

        let hod = fx.user("Hana", "Head", UserRole::Hod, Some(fx.cs)).await;
        let hod_ctx = RequestContext::new(hod);
        let (read, data) = fx.archive.read_file(&hod_ctx, legacy.id).await.unwrap();
        assert_eq!(read.id, legacy.id);
        assert_eq!(data, Bytes::from("old"));
        assert_eq!(fx.archive.accessible_files(&hod_ctx).await.unwrap().len(), 2);

        let dean = fx.user("Dee", "Dean", UserRole::Deanship, None).await;
        let dean_ctx = RequestContext::new(dean);
        let cs_files = fx.archive.department_files(&dean_ctx, Some(fx.cs)).await.unwrap();
        assert_eq!(cs_files.len(), 2);

        let mona = fx.user("Mona", "Math", UserRole::Professor, Some(fx.math)).await;
        let err = fx
            .archive
            .read_file(&RequestContext::new(mona), legacy.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_hidden_files_are_audited() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let file = fx
            .archive
            .store_file(&RequestContext::new(john), SYLLABUS, "a.pdf", Bytes::from("x"), None)
            .await
            .unwrap();

        let mona = fx.user("Mona", "Math", UserRole::Hod, Some(fx.math)).await;
        let mona_ctx = RequestContext::new(mona.clone());
        assert!(fx.archive.accessible_files(&mona_ctx).await.unwrap().is_empty());
        assert!(fx.archive.department_files(&mona_ctx, None).await.unwrap().is_empty());
        assert_eq!(
            fx.audit.resources_of(mona.id),
            vec![file.file_url.clone(), "department files".to_string()]
        );
    }

    #[tokio::test]
    async fn test_file_order_is_not_reused_after_delete() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let ctx = RequestContext::new(john);

        let mut orders = Vec::new();
        let mut files = Vec::new();
        for name in ["a.pdf", "b.pdf"] {
            let file = fx
                .archive
                .store_file(&ctx, SYLLABUS, name, Bytes::from("x"), None)
                .await
                .unwrap();
            orders.push(file.file_order);
            files.push(file);
        }
        fx.archive.delete_file(&ctx, files[0].id).await.unwrap();
        let third = fx
            .archive
            .store_file(&ctx, SYLLABUS, "c.pdf", Bytes::from("x"), None)
            .await
            .unwrap();
        orders.push(third.file_order);
        assert_eq!(orders, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_delete_file() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        let (_, assignment) = fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let ctx = RequestContext::new(john.clone());
        let file = fx
            .archive
            .store_file(&ctx, SYLLABUS, "a.pdf", Bytes::from("x"), None)
            .await
            .unwrap();

        let hod = fx.user("Hana", "Head", UserRole::Hod, Some(fx.cs)).await;
        let err = fx
            .archive
            .delete_file(&RequestContext::new(hod), file.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        fx.archive.delete_file(&ctx, file.id).await.unwrap();
        assert!(!fx.store.exists(&file.file_url).await.unwrap());
        assert!(fx.stores.files.find_by_id(file.id).await.unwrap().is_none());
        let submission = fx
            .stores
            .submissions
            .find_for(assignment.id, DocumentType::Syllabus)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.file_count, 0);
        assert_eq!(submission.status, SubmissionStatus::NotUploaded);

        let err = fx.archive.delete_file(&ctx, file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_upload_into_someone_elses_folder_is_refused() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let folder = fx
            .provisioner
            .get_or_create_folder_by_path(SYLLABUS, &john)
            .await
            .unwrap();

        let jane = fx.user("Jane", "Roe", UserRole::Professor, Some(fx.cs)).await;
        let err = fx
            .archive
            .store_file(&RequestContext::new(jane), &folder.path, "a.pdf", Bytes::from("x"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let (files, _) = fx.store.count_entries(&folder.path).await.unwrap();
        assert_eq!(files, 0);
    }
}
