//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;
use archive_entity::folder::{CreateFolder, Folder, FolderType};

use super::map_write_error;
use crate::store::FolderStore;

/// Repository for folder rows.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE path = $1")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find folder by path", e)
            })
    }

    async fn find_professor_root(
        &self,
        owner_id: i64,
        academic_year_id: i64,
        semester_id: i64,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND academic_year_id = $2 AND semester_id = $3 \
               AND folder_type = $4 \
             ORDER BY id ASC LIMIT 1",
        )
        .bind(owner_id)
        .bind(academic_year_id)
        .bind(semester_id)
        .bind(FolderType::ProfessorRoot)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find professor folder", e)
        })
    }

    async fn find_course_folder(
        &self,
        owner_id: i64,
        course_id: i64,
        semester_id: i64,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND course_id = $2 AND semester_id = $3 AND folder_type = $4 \
             ORDER BY id ASC LIMIT 1",
        )
        .bind(owner_id)
        .bind(course_id)
        .bind(semester_id)
        .bind(FolderType::Course)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find course folder", e))
    }

    async fn list_children(&self, parent_id: i64) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE parent_id = $1 ORDER BY name ASC")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn list_all(&self) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders \
             (path, name, folder_type, parent_id, owner_id, academic_year_id, semester_id, course_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&data.path)
        .bind(&data.name)
        .bind(data.folder_type)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .bind(data.academic_year_id)
        .bind(data.semester_id)
        .bind(data.course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                format!("Folder path '{}' already exists", data.path),
                "Failed to create folder",
            )
        })
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete folder", e))?;
        Ok(())
    }
}
