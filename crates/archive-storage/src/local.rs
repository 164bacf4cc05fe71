//! Local filesystem storage under the upload root.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;

use crate::resolver::PathResolver;

/// Metadata of one file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    /// Last path segment.
    pub name: String,
    /// Root-relative path.
    pub path: String,
    /// Size in bytes (directories report the platform value).
    pub size: u64,
    /// Last modification time.
    pub modified: Option<DateTime<Utc>>,
    /// Whether this is a directory.
    pub is_directory: bool,
    /// Whether this is a regular file.
    pub is_file: bool,
}

impl EntryMeta {
    /// Modification time in epoch milliseconds, `0` when unknown.
    pub fn modified_millis(&self) -> i64 {
        self.modified.map(|t| t.timestamp_millis()).unwrap_or(0)
    }
}

/// Byte storage for uploaded files, confined by a [`PathResolver`].
#[derive(Debug, Clone)]
pub struct LocalStore {
    resolver: Arc<PathResolver>,
}

fn storage_error(action: &str, path: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Path not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {path}"), e)
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

impl LocalStore {
    /// Create a store over an initialized resolver.
    pub fn new(resolver: Arc<PathResolver>) -> Self {
        Self { resolver }
    }

    /// The resolver confining this store.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Write bytes, creating parent directories.
    pub async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolver.resolve(path).await?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Wrote file");
        Ok(())
    }

    /// Read a whole file.
    pub async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolver.resolve(path).await?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| storage_error("read file", path, e))?;
        Ok(Bytes::from(data))
    }

    /// Delete a regular file. Returns `false` when it did not exist.
    pub async fn delete(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolver.resolve(path).await?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {path}"),
                e,
            )),
        }
    }

    /// Whether anything exists at `path`.
    pub async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolver.resolve(path).await?;
        Ok(fs::try_exists(&full_path).await.unwrap_or(false))
    }

    /// Metadata of a single entry.
    pub async fn metadata(&self, path: &str) -> AppResult<EntryMeta> {
        let full_path = self.resolver.resolve(path).await?;
        let meta = fs::metadata(&full_path)
            .await
            .map_err(|e| storage_error("get metadata", path, e))?;

        Ok(EntryMeta {
            name: PathResolver::get_name(path),
            path: PathResolver::normalize_path(path),
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            is_directory: meta.is_dir(),
            is_file: meta.is_file(),
        })
    }

    /// Immediate entries of a directory, directories first, then by name.
    /// A missing directory lists as empty.
    pub async fn list(&self, path: &str) -> AppResult<Vec<EntryMeta>> {
        let parent = PathResolver::normalize_path(path);
        let full_path = self.resolver.resolve(&parent).await?;
        let mut dir = match fs::read_dir(&full_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error("list directory", &parent, e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let entry_meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();

            entries.push(EntryMeta {
                path: join_path(&parent, &name),
                name,
                size: entry_meta.len(),
                modified: entry_meta.modified().ok().map(DateTime::<Utc>::from),
                is_directory: entry_meta.is_dir(),
                is_file: entry_meta.is_file(),
            });
        }

        entries.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(entries)
    }

    /// Counts of immediate regular files and subdirectories.
    pub async fn count_entries(&self, path: &str) -> AppResult<(u64, u64)> {
        let entries = self.list(path).await?;
        let folders = entries.iter().filter(|e| e.is_directory).count() as u64;
        let files = entries.iter().filter(|e| e.is_file).count() as u64;
        Ok((files, folders))
    }

    /// Every regular file under `path`, recursively, as root-relative paths.
    pub async fn walk_files(&self, path: &str) -> AppResult<Vec<String>> {
        let mut pending = vec![PathResolver::normalize_path(path)];
        let mut files = Vec::new();
        while let Some(dir) = pending.pop() {
            for entry in self.list(&dir).await? {
                if entry.is_directory {
                    pending.push(entry.path);
                } else if entry.is_file {
                    files.push(entry.path);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}
