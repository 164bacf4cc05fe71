//! Physical directory listing view models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::submission::DocumentType;

/// Classification of a physical directory by its depth under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderKind {
    /// The upload root itself.
    Root,
    /// Depth 1.
    Year,
    /// Depth 2.
    Semester,
    /// Depth 3.
    Professor,
    /// Depth 4.
    Course,
    /// Depth 5 with a standard document-type name.
    DocumentType,
    /// Anything else.
    Custom,
}

impl FolderKind {
    /// Classify a normalized root-relative path.
    pub fn classify(path: &str) -> Self {
        if path.is_empty() {
            return Self::Root;
        }
        let parts: Vec<&str> = path.split('/').collect();
        match parts.len() {
            1 => Self::Year,
            2 => Self::Semester,
            3 => Self::Professor,
            4 => Self::Course,
            5 if DocumentType::from_folder_name(parts[4]).is_some() => Self::DocumentType,
            _ => Self::Custom,
        }
    }

    /// Standard hierarchy folders cannot be deleted from the explorer.
    pub fn is_system(&self) -> bool {
        !matches!(self, Self::Root | Self::Custom)
    }
}

/// Professor details attached to folders at or below the professor level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMetadata {
    /// Resolved professor id.
    pub professor_id: Option<i64>,
    /// Professor display name.
    pub professor_name: Option<String>,
    /// Professor department.
    pub department_id: Option<i64>,
    /// Whether the caller is that professor.
    pub is_own_folder: bool,
}

/// A subdirectory entry of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderItem {
    /// Directory name.
    pub name: String,
    /// Root-relative path.
    pub path: String,
    /// Last modification time.
    pub modified_at: Option<DateTime<Utc>>,
    /// Folder row id, when one exists at this path.
    pub id: Option<i64>,
    /// Depth classification.
    pub folder_type: FolderKind,
    /// Immediate child count, `-1` when unreadable.
    pub item_count: i64,
    /// Caller may write inside.
    pub can_write: bool,
    /// Caller may delete it; never true for system folders.
    pub can_delete: bool,
    /// Part of the standard hierarchy.
    pub is_system_folder: bool,
    /// Professor details.
    pub metadata: FolderMetadata,
}

/// A regular-file entry of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    /// Original filename, or the disk name for orphans.
    pub name: String,
    /// Name on disk.
    pub stored_name: String,
    /// Root-relative path.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Human-readable size.
    pub size_formatted: String,
    /// MIME type guessed from the extension.
    pub mime_type: String,
    /// Extension without the dot (may be empty).
    pub extension: String,
    /// Last modification time.
    pub modified_at: Option<DateTime<Utc>>,
    /// Upload time from the DB row.
    pub uploaded_at: Option<DateTime<Utc>>,
    /// File row id.
    pub id: Option<i64>,
    /// Uploader display name.
    pub uploader_name: Option<String>,
    /// Uploader id.
    pub uploader_id: Option<i64>,
    /// Uploader notes.
    pub notes: Option<String>,
    /// No DB row matches this file.
    pub orphaned: bool,
    /// Caller may delete it.
    pub can_delete: bool,
    /// Caller may replace it.
    pub can_replace: bool,
    /// Can be rendered inline.
    pub previewable: bool,
    /// Download endpoint, when a row exists.
    pub download_url: Option<String>,
    /// Preview endpoint, when a row exists and the type is previewable.
    pub preview_url: Option<String>,
}

/// One page of a physical directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Normalized root-relative path (`""` for the root).
    pub path: String,
    /// Directory name (`"Uploads"` for the root).
    pub name: String,
    /// Folders on this page.
    pub folders: Vec<FolderItem>,
    /// Files on this page.
    pub files: Vec<FileItem>,
    /// Visible folders plus files across all pages.
    pub total_items: u64,
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub page_size: u64,
    /// Number of pages.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_more: bool,
    /// Weak ETag of the directory.
    pub etag: String,
    /// Caller may upload here.
    pub can_write: bool,
    /// Caller may delete here.
    pub can_delete: bool,
    /// Caller may create folders here.
    pub can_create_folder: bool,
    /// Parent path (`""` at the first level and the root).
    pub parent_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_depth() {
        assert_eq!(FolderKind::classify(""), FolderKind::Root);
        assert_eq!(FolderKind::classify("2024-2025"), FolderKind::Year);
        assert_eq!(FolderKind::classify("2024-2025/first"), FolderKind::Semester);
        assert_eq!(
            FolderKind::classify("2024-2025/first/John Doe"),
            FolderKind::Professor
        );
        assert_eq!(
            FolderKind::classify("2024-2025/first/John Doe/CS101 - Intro"),
            FolderKind::Course
        );
        assert_eq!(
            FolderKind::classify("2024-2025/first/John Doe/CS101 - Intro/Course Notes"),
            FolderKind::DocumentType
        );
        assert_eq!(
            FolderKind::classify("2024-2025/first/John Doe/CS101 - Intro/Labs"),
            FolderKind::Custom
        );
        assert_eq!(
            FolderKind::classify("2024-2025/first/John Doe/CS101 - Intro/Exams/old"),
            FolderKind::Custom
        );
    }

    #[test]
    fn test_system_folders() {
        assert!(FolderKind::Course.is_system());
        assert!(!FolderKind::Custom.is_system());
        assert!(!FolderKind::Root.is_system());
    }
}
