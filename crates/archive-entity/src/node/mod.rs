//! Logical hierarchy nodes (not persisted).

pub mod model;

pub use model::{AttachedFile, Breadcrumb, Node, NodeType};
