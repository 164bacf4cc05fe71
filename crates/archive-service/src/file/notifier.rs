//! Upload notifications.

use std::fmt;

use async_trait::async_trait;
use tracing::info;

use archive_core::result::AppResult;
use archive_entity::file::UploadedFile;
use archive_entity::folder::Folder;
use archive_entity::user::User;

/// Receives an event for every stored upload.
///
/// Delivery is best-effort: the archive logs a failed notification and
/// keeps the upload.
#[async_trait]
pub trait UploadNotifier: Send + Sync + fmt::Debug {
    /// Called after the file row is committed.
    async fn notify_upload(
        &self,
        uploader: &User,
        file: &UploadedFile,
        folder: &Folder,
    ) -> AppResult<()>;
}

/// Writes upload events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingUploadNotifier;

#[async_trait]
impl UploadNotifier for LoggingUploadNotifier {
    async fn notify_upload(
        &self,
        uploader: &User,
        file: &UploadedFile,
        folder: &Folder,
    ) -> AppResult<()> {
        info!(
            target: "archive::upload",
            uploader_id = uploader.id,
            file_id = file.id,
            folder_id = folder.id,
            filename = %file.original_filename,
            folder = %folder.path,
            "File uploaded"
        );
        Ok(())
    }
}
