//! Convenience result type alias for the archive.

use crate::error::AppError;

/// A specialized `Result` type for archive operations.
pub type AppResult<T> = Result<T, AppError>;
