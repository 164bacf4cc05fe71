//! User entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A university staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role.
    pub role: UserRole,
    /// Department; absent for ADMIN and DEANSHIP.
    pub department_id: Option<i64>,
    /// Legacy external professor tag.
    pub professor_id: Option<String>,
    /// Whether the account is active.
    pub is_active: bool,
}

impl User {
    /// `"First Last"`, trimmed. Mutable, so never an identity.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Check if this user is a professor.
    pub fn is_professor(&self) -> bool {
        self.role == UserRole::Professor
    }
}
