//! Document submission entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::document_type::DocumentType;

/// Upload state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// No files yet.
    NotUploaded,
    /// At least one file uploaded.
    Uploaded,
    /// Deadline passed with nothing uploaded.
    Overdue,
}

/// Groups the files of one document type within one course assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DocumentSubmission {
    /// Unique identifier.
    pub id: i64,
    /// The course assignment.
    pub course_assignment_id: i64,
    /// Document type.
    pub document_type: DocumentType,
    /// Submitting professor.
    pub professor_id: i64,
    /// Number of files; recomputed after every add/replace/delete.
    pub file_count: i32,
    /// Sum of file sizes; recomputed with `file_count`.
    pub total_file_size: i64,
    /// When the submission was first made.
    pub submitted_at: DateTime<Utc>,
    /// Whether it arrived after the deadline.
    pub is_late_submission: bool,
    /// Upload state.
    pub status: SubmissionStatus,
    /// Professor notes.
    pub notes: Option<String>,
}

/// Data required to create a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubmission {
    /// The course assignment.
    pub course_assignment_id: i64,
    /// Document type.
    pub document_type: DocumentType,
    /// Submitting professor.
    pub professor_id: i64,
}
