//! Academic year entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An academic year such as `2024-2025`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AcademicYear {
    /// Unique identifier.
    pub id: i64,
    /// Unique year code; also the first segment of every hierarchy path.
    pub year_code: String,
    /// Whether the year is shown when browsing.
    pub is_active: bool,
}
