//! Transient hierarchy nodes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Level of a node in the logical hierarchy, determined by segment count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Empty path.
    Root,
    /// One segment.
    Year,
    /// Two segments.
    Semester,
    /// Three segments.
    Professor,
    /// Four segments.
    Course,
    /// Five segments.
    DocumentType,
}

impl NodeType {
    /// Node type for a path with `depth` segments; `None` past five.
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            0 => Some(Self::Root),
            1 => Some(Self::Year),
            2 => Some(Self::Semester),
            3 => Some(Self::Professor),
            4 => Some(Self::Course),
            5 => Some(Self::DocumentType),
            _ => None,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Root => "ROOT",
            Self::Year => "YEAR",
            Self::Semester => "SEMESTER",
            Self::Professor => "PROFESSOR",
            Self::Course => "COURSE",
            Self::DocumentType => "DOCUMENT_TYPE",
        };
        write!(f, "{s}")
    }
}

/// A file attached to a document-type node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedFile {
    /// File row id.
    pub id: i64,
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Size in bytes.
    pub file_size: Option<i64>,
    /// MIME type.
    pub file_type: Option<String>,
    /// Uploader display name, falling back to the owning professor.
    pub uploader_name: Option<String>,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Uploader notes.
    pub notes: Option<String>,
}

/// One point in the logical hierarchy, built per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Logical path with a leading slash, e.g. `/2024-2025/first`.
    pub path: String,
    /// Display name.
    pub name: String,
    /// Level.
    pub node_type: NodeType,
    /// Backing entity id (year, semester, user, assignment, or folder).
    pub entity_id: Option<i64>,
    /// Read permission for the caller.
    pub can_read: bool,
    /// Write permission for the caller.
    pub can_write: bool,
    /// Delete permission for the caller.
    pub can_delete: bool,
    /// Level-specific ids, names, and counts.
    pub metadata: Map<String, Value>,
    /// Child nodes, when expanded.
    pub children: Vec<Node>,
    /// Files, for document-type nodes.
    pub attached_files: Vec<AttachedFile>,
}

impl Node {
    /// Create a node with no permissions, metadata, or children.
    pub fn new(path: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            node_type,
            entity_id: None,
            can_read: false,
            can_write: false,
            can_delete: false,
            metadata: Map::new(),
            children: Vec::new(),
            attached_files: Vec::new(),
        }
    }

    /// Builder-style entity id.
    pub fn with_entity(mut self, id: i64) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Builder-style permission flags.
    pub fn with_permissions(mut self, can_read: bool, can_write: bool, can_delete: bool) -> Self {
        self.can_read = can_read;
        self.can_write = can_write;
        self.can_delete = can_delete;
        self
    }

    /// Insert one metadata entry.
    pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Display name.
    pub name: String,
    /// Logical path with a leading slash.
    pub path: String,
    /// Level.
    pub node_type: NodeType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_mapping() {
        assert_eq!(NodeType::from_depth(0), Some(NodeType::Root));
        assert_eq!(NodeType::from_depth(3), Some(NodeType::Professor));
        assert_eq!(NodeType::from_depth(5), Some(NodeType::DocumentType));
        assert_eq!(NodeType::from_depth(6), None);
    }

    #[test]
    fn test_builder() {
        let node = Node::new("/2024-2025", "2024-2025", NodeType::Year)
            .with_entity(3)
            .with_permissions(true, false, false)
            .meta("yearCode", "2024-2025");
        assert_eq!(node.entity_id, Some(3));
        assert!(node.can_read && !node.can_write);
        assert_eq!(node.metadata["yearCode"], "2024-2025");
    }
}
