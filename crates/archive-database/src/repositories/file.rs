//! Uploaded file repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;
use archive_entity::file::{CreateUploadedFile, UploadedFile};

use crate::store::FileStore;

/// Repository for uploaded file rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UploadedFile>> {
        sqlx::query_as::<_, UploadedFile>("SELECT * FROM uploaded_files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_file_url(&self, file_url: &str) -> AppResult<Option<UploadedFile>> {
        sqlx::query_as::<_, UploadedFile>(
            "SELECT * FROM uploaded_files WHERE file_url = $1 ORDER BY id ASC LIMIT 1",
        )
        .bind(file_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file by url", e))
    }

    async fn find_by_stored_filename(&self, stored: &str) -> AppResult<Option<UploadedFile>> {
        sqlx::query_as::<_, UploadedFile>(
            "SELECT * FROM uploaded_files WHERE stored_filename = $1 ORDER BY id ASC LIMIT 1",
        )
        .bind(stored)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find file by stored name", e)
        })
    }

    async fn list_by_submission(&self, submission_id: i64) -> AppResult<Vec<UploadedFile>> {
        sqlx::query_as::<_, UploadedFile>(
            "SELECT * FROM uploaded_files WHERE document_submission_id = $1 \
             ORDER BY file_order DESC NULLS LAST, created_at DESC",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn list_all(&self) -> AppResult<Vec<UploadedFile>> {
        sqlx::query_as::<_, UploadedFile>("SELECT * FROM uploaded_files ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn create(&self, data: &CreateUploadedFile) -> AppResult<UploadedFile> {
        sqlx::query_as::<_, UploadedFile>(
            "INSERT INTO uploaded_files \
             (original_filename, stored_filename, file_url, file_size, file_type, uploader_id, \
              document_submission_id, folder_id, file_order, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(&data.original_filename)
        .bind(&data.stored_filename)
        .bind(&data.file_url)
        .bind(data.file_size)
        .bind(&data.file_type)
        .bind(data.uploader_id)
        .bind(data.document_submission_id)
        .bind(data.folder_id)
        .bind(data.file_order)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM uploaded_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(())
    }
}
