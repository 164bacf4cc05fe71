//! PostgreSQL implementations of the store traits.

pub mod academic;
pub mod file;
pub mod folder;
pub mod submission;
pub mod transaction;
pub mod user;

pub use academic::AcademicRepository;
pub use file::FileRepository;
pub use folder::FolderRepository;
pub use submission::SubmissionRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;

use std::sync::Arc;

use sqlx::PgPool;

use archive_core::error::{AppError, ErrorKind};

use crate::store::Stores;

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error, turning unique violations into `Conflict`.
pub(crate) fn map_write_error(e: sqlx::Error, conflict: String, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::conflict(conflict)
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

impl Stores {
    /// Build PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            academic: Arc::new(AcademicRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            folders: Arc::new(FolderRepository::new(pool.clone())),
            files: Arc::new(FileRepository::new(pool.clone())),
            submissions: Arc::new(SubmissionRepository::new(pool.clone())),
            transactions: Arc::new(TransactionRepository::new(pool)),
        }
    }
}
