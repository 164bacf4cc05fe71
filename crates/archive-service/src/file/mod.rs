//! Archive file operations: storing, reading, and deleting uploads.

pub mod archive;
pub mod notifier;

pub use archive::FileArchiveService;
pub use notifier::{LoggingUploadNotifier, UploadNotifier};
