//! Folder provisioning for professors and their courses.

pub mod folder;

pub use folder::FolderProvisioner;
