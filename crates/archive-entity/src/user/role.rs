//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four roles of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// System administrator.
    Admin,
    /// Dean's office; reads everything, writes nothing.
    Deanship,
    /// Head of department; reads within the department.
    Hod,
    /// Teaching staff; owns a professor folder per semester.
    Professor,
}

impl UserRole {
    /// ADMIN and DEANSHIP see every department.
    pub fn is_admin_level(&self) -> bool {
        matches!(self, Self::Admin | Self::Deanship)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Deanship => "deanship",
            Self::Hod => "hod",
            Self::Professor => "professor",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = archive_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        match lower.trim_start_matches("role_") {
            "admin" => Ok(Self::Admin),
            "deanship" => Ok(Self::Deanship),
            "hod" => Ok(Self::Hod),
            "professor" => Ok(Self::Professor),
            _ => Err(archive_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, deanship, hod, professor"
            ))),
        }
    }
}
