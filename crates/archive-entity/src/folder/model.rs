//! Folder entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of folder in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "folder_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderType {
    /// `{year}`
    YearRoot,
    /// `{year}/{semester}`
    SemesterRoot,
    /// `{year}/{semester}/{professor}`
    ProfessorRoot,
    /// `{professor root}/{code} - {name}`
    Course,
    /// One of the four standard document-type folders.
    Subfolder,
    /// User-created folder outside the standard hierarchy.
    Custom,
}

impl FolderType {
    /// Primary folders must always exist on disk and are recreated when
    /// missing; only CUSTOM folders may lose their row.
    pub fn is_primary(&self) -> bool {
        !matches!(self, Self::Custom)
    }

    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YearRoot => "year_root",
            Self::SemesterRoot => "semester_root",
            Self::ProfessorRoot => "professor_root",
            Self::Course => "course",
            Self::Subfolder => "subfolder",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for FolderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A folder row. `path` is unique and equals `parent.path + "/" + name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: i64,
    /// Root-relative path, e.g. `2024-2025/first/John Doe/CS101 - Intro`.
    pub path: String,
    /// Last path segment.
    pub name: String,
    /// Folder kind.
    pub folder_type: FolderType,
    /// Parent folder (null for hierarchy roots).
    pub parent_id: Option<i64>,
    /// Owning user.
    pub owner_id: i64,
    /// Academic year the folder belongs to.
    pub academic_year_id: Option<i64>,
    /// Semester the folder belongs to.
    pub semester_id: Option<i64>,
    /// Course, for course folders and below.
    pub course_id: Option<i64>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Root-relative path.
    pub path: String,
    /// Folder name.
    pub name: String,
    /// Folder kind.
    pub folder_type: FolderType,
    /// Parent folder.
    pub parent_id: Option<i64>,
    /// Owning user.
    pub owner_id: i64,
    /// Academic year.
    pub academic_year_id: Option<i64>,
    /// Semester.
    pub semester_id: Option<i64>,
    /// Course.
    pub course_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_custom_is_not_primary() {
        assert!(FolderType::YearRoot.is_primary());
        assert!(FolderType::SemesterRoot.is_primary());
        assert!(FolderType::ProfessorRoot.is_primary());
        assert!(FolderType::Course.is_primary());
        assert!(FolderType::Subfolder.is_primary());
        assert!(!FolderType::Custom.is_primary());
    }
}
