//! Document submission repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;
use archive_entity::submission::{
    CreateSubmission, DocumentSubmission, DocumentType, SubmissionStatus,
};

use super::map_write_error;
use crate::store::SubmissionStore;

/// Repository for document submissions.
#[derive(Debug, Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    /// Create a new submission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for SubmissionRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<DocumentSubmission>> {
        sqlx::query_as::<_, DocumentSubmission>("SELECT * FROM document_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find submission", e)
            })
    }

    async fn find_for(
        &self,
        course_assignment_id: i64,
        document_type: DocumentType,
    ) -> AppResult<Option<DocumentSubmission>> {
        sqlx::query_as::<_, DocumentSubmission>(
            "SELECT * FROM document_submissions \
             WHERE course_assignment_id = $1 AND document_type = $2",
        )
        .bind(course_assignment_id)
        .bind(document_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find submission", e))
    }

    async fn list_by_assignment(
        &self,
        course_assignment_id: i64,
    ) -> AppResult<Vec<DocumentSubmission>> {
        sqlx::query_as::<_, DocumentSubmission>(
            "SELECT * FROM document_submissions WHERE course_assignment_id = $1 ORDER BY id ASC",
        )
        .bind(course_assignment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list submissions", e))
    }

    async fn create(&self, data: &CreateSubmission) -> AppResult<DocumentSubmission> {
        sqlx::query_as::<_, DocumentSubmission>(
            "INSERT INTO document_submissions (course_assignment_id, document_type, professor_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.course_assignment_id)
        .bind(data.document_type)
        .bind(data.professor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                format!(
                    "Submission for assignment {} and type {} already exists",
                    data.course_assignment_id,
                    data.document_type.url_segment()
                ),
                "Failed to create submission",
            )
        })
    }

    async fn update_statistics(
        &self,
        id: i64,
        file_count: i32,
        total_file_size: i64,
        status: SubmissionStatus,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE document_submissions \
             SET file_count = $1, total_file_size = $2, status = $3 WHERE id = $4",
        )
        .bind(file_count)
        .bind(total_file_size)
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update submission", e)
        })?;
        Ok(())
    }
}
