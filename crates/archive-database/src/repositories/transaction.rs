//! Transaction-scoped deletions.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;

use crate::store::{StoreTransaction, TransactionStore};

/// Opens PostgreSQL transactions on the shared pool.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    /// Create a new transaction repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }
}

/// One open transaction. Rolled back by sqlx when dropped uncommitted.
struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn delete_folder(&mut self, id: i64) -> AppResult<()> {
        // Children cascade and contained files are detached by the schema.
        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete folder", e))?;
        Ok(())
    }

    async fn delete_file(&mut self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM uploaded_files WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}
