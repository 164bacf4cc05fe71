//! Uploaded file entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata row for one physical file.
///
/// A file is browsable when it links to a submission, a folder, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UploadedFile {
    /// Unique file identifier.
    pub id: i64,
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Name on disk.
    pub stored_filename: Option<String>,
    /// Root-relative physical path.
    pub file_url: String,
    /// Size in bytes.
    pub file_size: Option<i64>,
    /// MIME type recorded at upload.
    pub file_type: Option<String>,
    /// Uploading user.
    pub uploader_id: Option<i64>,
    /// Legacy per-document-type grouping.
    pub document_submission_id: Option<i64>,
    /// File-explorer folder.
    pub folder_id: Option<i64>,
    /// Ordering within a submission.
    pub file_order: Option<i32>,
    /// Free-form uploader notes.
    pub notes: Option<String>,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the file was last replaced.
    pub updated_at: DateTime<Utc>,
}

/// Data required to record a new uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUploadedFile {
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Name on disk.
    pub stored_filename: String,
    /// Root-relative physical path.
    pub file_url: String,
    /// Size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub file_type: Option<String>,
    /// Uploading user.
    pub uploader_id: i64,
    /// Submission grouping.
    pub document_submission_id: Option<i64>,
    /// Containing folder.
    pub folder_id: Option<i64>,
    /// Ordering within the submission.
    pub file_order: Option<i32>,
    /// Uploader notes.
    pub notes: Option<String>,
}
