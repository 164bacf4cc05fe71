//! Embedded schema migrations.

use sqlx::PgPool;
use tracing::info;

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Applying archive schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Archive schema is up to date");
    Ok(())
}
