//! Enforcement of access rules: turns a refused check into an audited
//! `Authorization` error.

use std::sync::Arc;

use archive_core::error::AppError;
use archive_core::result::AppResult;
use archive_entity::file::UploadedFile;
use archive_entity::user::User;

use super::access::{AccessPolicy, FileOwner};
use super::audit::{AuditSink, TracingAuditSink};

/// Checks a policy decision and audits refusals.
#[derive(Debug, Clone)]
pub struct AccessEnforcer {
    sink: Arc<dyn AuditSink>,
}

impl AccessEnforcer {
    /// Create an enforcer reporting to the given sink.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Fail with `Authorization` when `allowed` is false, recording the
    /// denial first.
    pub fn require(
        &self,
        policy: &AccessPolicy,
        allowed: bool,
        resource: &str,
        reason: &str,
    ) -> AppResult<()> {
        if allowed {
            return Ok(());
        }
        self.sink.record_denial(policy.user_id(), resource, reason);
        Err(AppError::authorization(format!(
            "Access denied to '{resource}': {reason}"
        )))
    }

    /// Require read access to a professor's folders.
    pub fn require_read_professor(
        &self,
        policy: &AccessPolicy,
        professor: &User,
        resource: &str,
    ) -> AppResult<()> {
        self.require(
            policy,
            policy.can_read_professor(professor),
            resource,
            "professor belongs to another department",
        )
    }

    /// Require permission to upload into a folder owned by `owner_id`.
    pub fn require_upload(
        &self,
        policy: &AccessPolicy,
        owner_id: i64,
        resource: &str,
    ) -> AppResult<()> {
        self.require(
            policy,
            policy.can_upload_to_folder(owner_id),
            resource,
            "only the folder owner may upload",
        )
    }

    /// Require permission to delete a file uploaded by `owner_id`.
    pub fn require_delete(
        &self,
        policy: &AccessPolicy,
        owner_id: i64,
        resource: &str,
    ) -> AppResult<()> {
        self.require(
            policy,
            policy.can_delete(owner_id),
            resource,
            "only the uploading professor may delete",
        )
    }

    /// Whether a directory may appear in a listing or tree. Hidden
    /// directories are recorded as denials.
    pub fn can_view_path(&self, policy: &AccessPolicy, path: &str, owner: Option<&User>) -> bool {
        let visible = policy.can_view_path(path, owner);
        if !visible {
            self.sink
                .record_denial(policy.user_id(), path, "directory belongs to another department");
        }
        visible
    }

    /// The files the caller may see, recording one denial per file dropped.
    pub fn filter_accessible_files<F>(
        &self,
        policy: &AccessPolicy,
        files: Vec<UploadedFile>,
        owner: F,
    ) -> Vec<UploadedFile>
    where
        F: Fn(&UploadedFile) -> FileOwner,
    {
        let (visible, hidden): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|f| policy.can_see_file(owner(f)));
        for file in &hidden {
            self.sink
                .record_denial(policy.user_id(), &file.file_url, "file is not visible to caller");
        }
        visible
    }

    /// Department report over `files`; callers without admin-level access
    /// get nothing and a recorded denial.
    pub fn filter_by_department<F>(
        &self,
        policy: &AccessPolicy,
        files: Vec<UploadedFile>,
        department_id: Option<i64>,
        owner: F,
    ) -> Vec<UploadedFile>
    where
        F: Fn(&UploadedFile) -> FileOwner,
    {
        if !policy.has_admin_level_access() {
            self.sink.record_denial(
                policy.user_id(),
                "department files",
                "admin-level access required",
            );
        }
        policy.filter_by_department(files, department_id, owner)
    }
}

impl Default for AccessEnforcer {
    fn default() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use archive_core::error::ErrorKind;
    use archive_entity::user::UserRole;
    use chrono::Utc;

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingSink {
        denials: Mutex<Vec<(i64, String, String)>>,
    }

    impl AuditSink for RecordingSink {
        fn record_denial(&self, user_id: i64, resource: &str, reason: &str) {
            self.denials
                .lock()
                .unwrap()
                .push((user_id, resource.to_string(), reason.to_string()));
        }
    }

    fn professor(id: i64) -> User {
        User {
            id,
            email: "p@example.edu".into(),
            first_name: "P".into(),
            last_name: "Q".into(),
            role: UserRole::Professor,
            department_id: Some(1),
            professor_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_denial_is_audited() {
        let sink = Arc::new(RecordingSink::default());
        let enforcer = AccessEnforcer::new(sink.clone());
        let policy = AccessPolicy::for_user(&professor(7));

        let err = enforcer.require_delete(&policy, 8, "file:42").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let denials = sink.denials.lock().unwrap();
        assert_eq!(denials.len(), 1);
        assert_eq!(denials[0].0, 7);
        assert_eq!(denials[0].1, "file:42");
    }

    #[test]
    fn test_allowed_is_silent() {
        let sink = Arc::new(RecordingSink::default());
        let enforcer = AccessEnforcer::new(sink.clone());
        let policy = AccessPolicy::for_user(&professor(7));

        enforcer.require_upload(&policy, 7, "folder:1").unwrap();
        enforcer
            .require_read_professor(&policy, &professor(9), "2024-2025/first/P Q")
            .unwrap();
        assert!(sink.denials.lock().unwrap().is_empty());
    }

    fn file(id: i64, uploader_id: i64) -> UploadedFile {
        UploadedFile {
            id,
            original_filename: format!("f{id}.pdf"),
            stored_filename: None,
            file_url: format!("x/f{id}.pdf"),
            file_size: Some(1),
            file_type: None,
            uploader_id: Some(uploader_id),
            document_submission_id: None,
            folder_id: None,
            file_order: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filtered_entries_are_audited() {
        let sink = Arc::new(RecordingSink::default());
        let enforcer = AccessEnforcer::new(sink.clone());
        let policy = AccessPolicy::for_user(&professor(7));
        let owner = |f: &UploadedFile| FileOwner {
            user_id: f.uploader_id,
            department_id: Some(1),
        };

        let files = vec![file(1, 7), file(2, 8)];
        let visible = enforcer.filter_accessible_files(&policy, files, owner);
        assert_eq!(visible.len(), 1);
        assert!(!enforcer.can_view_path(&policy, "2024-2025/first/Other Prof", None));
        assert!(enforcer.can_view_path(&policy, "2024-2025/first", None));
        let report = enforcer.filter_by_department(&policy, vec![file(3, 7)], None, owner);
        assert!(report.is_empty());

        let denials = sink.denials.lock().unwrap();
        let resources: Vec<_> = denials.iter().map(|d| d.1.as_str()).collect();
        assert_eq!(
            resources,
            vec!["x/f2.pdf", "2024-2025/first/Other Prof", "department files"]
        );
        assert!(denials.iter().all(|d| d.0 == 7));
    }
}
