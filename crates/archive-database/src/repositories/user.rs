//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;
use archive_entity::user::User;

use crate::store::UserStore;

/// Repository for user lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_by_professor_tag(&self, tag: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE professor_id = $1")
            .bind(tag)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by tag", e)
            })
    }

    async fn list_professors(&self, department_id: Option<i64>) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users \
             WHERE role = 'professor' AND is_active = TRUE \
               AND ($1::BIGINT IS NULL OR department_id = $1) \
             ORDER BY first_name ASC, last_name ASC, id ASC",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list professors", e))
    }
}
