//! # archive-service
//!
//! Service layer of the academic archive. Each service orchestrates the
//! metadata stores, the listing cache, upload-root storage, and the access
//! policy to implement one family of use cases.
//!
//! Services follow constructor injection: every collaborator is handed in at
//! construction time and shared through `Arc` or cheap clones.
//!
//! ## Modules
//!
//! - `scanner`: physical directory listings, ETags, and lazy trees
//! - `hierarchy`: the logical year/semester/professor/course/document tree
//! - `provisioning`: idempotent folder creation
//! - `file`: upload, download, and delete flows
//! - `identity`: professor folder names and their resolution

pub mod context;
pub mod file;
pub mod hierarchy;
pub mod identity;
pub mod provisioning;
pub mod scanner;

#[cfg(test)]
mod testing;

pub use context::RequestContext;
pub use file::{FileArchiveService, LoggingUploadNotifier, UploadNotifier};
pub use hierarchy::{HierarchyNavigator, HierarchyPath};
pub use identity::IdentityResolver;
pub use provisioning::FolderProvisioner;
pub use scanner::FilesystemScanner;
