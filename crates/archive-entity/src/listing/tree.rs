//! Lazy directory tree view model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::FolderKind;

/// Context derived from a tree node's path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNodeMetadata {
    /// First segment.
    pub academic_year_code: Option<String>,
    /// Second segment.
    pub semester_type: Option<String>,
    /// Professor resolved from the third segment.
    pub professor_id: Option<i64>,
    /// Professor display name.
    pub professor_name: Option<String>,
    /// Professor department.
    pub department_id: Option<i64>,
    /// Whether the caller is that professor.
    pub is_own_folder: bool,
    /// Fourth segment.
    pub course_code: Option<String>,
}

/// A directory in a depth-limited tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryTreeNode {
    /// Directory name (`"Uploads"` for the root).
    pub name: String,
    /// Root-relative path.
    pub path: String,
    /// Depth classification.
    pub node_type: FolderKind,
    /// Folder row id at this path.
    pub entity_id: Option<i64>,
    /// Last modification time.
    pub modified_at: Option<DateTime<Utc>>,
    /// Any immediate entries exist.
    pub has_children: bool,
    /// Visible subdirectories, sorted by name; empty when not expanded.
    pub children: Vec<DirectoryTreeNode>,
    /// Whether `children` was populated.
    pub children_loaded: bool,
    /// Caller may write inside.
    pub can_write: bool,
    /// Caller may delete inside.
    pub can_delete: bool,
    /// Weak ETag.
    pub etag: String,
    /// Immediate regular files.
    pub file_count: u64,
    /// Immediate subdirectories.
    pub folder_count: u64,
    /// Path-derived context.
    pub metadata: TreeNodeMetadata,
}
