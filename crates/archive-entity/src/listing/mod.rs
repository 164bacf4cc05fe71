//! View models produced by the filesystem scanner.

pub mod directory;
pub mod tree;

pub use directory::{DirectoryListing, FileItem, FolderItem, FolderKind, FolderMetadata};
pub use tree::{DirectoryTreeNode, TreeNodeMetadata};
