//! Paginated, permission-filtered directory listings.

use std::cmp::Ordering;
use std::ops::Range;

use tracing::{debug, warn};

use archive_auth::AccessPolicy;
use archive_cache::keys;
use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;
use archive_core::types::{PageRequest, SortDirection, SortKey};
use archive_entity::file::UploadedFile;
use archive_entity::listing::{
    DirectoryListing, FileItem, FolderItem, FolderKind, FolderMetadata,
};
use archive_entity::user::User;
use archive_storage::{EntryMeta, PathResolver, mime};

use super::{FilesystemScanner, format_file_size};

/// Display name of the upload root.
pub const ROOT_NAME: &str = "Uploads";

/// Download endpoint of a file row.
pub fn download_url(file_id: i64) -> String {
    format!("/api/file-explorer/files/{file_id}/download")
}

/// Inline preview endpoint of a file row.
pub fn preview_url(file_id: i64) -> String {
    format!("/api/file-explorer/files/{file_id}/preview")
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Unknown modification times sort last.
fn compare_modified<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_folders(folders: &mut [FolderItem], key: SortKey, direction: SortDirection) {
    folders.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Modified => compare_modified(&a.modified_at, &b.modified_at),
            SortKey::Name | SortKey::Size => compare_names(&a.name, &b.name),
        };
        direction.apply(ordering)
    });
}

fn sort_files(files: &mut [FileItem], key: SortKey, direction: SortDirection) {
    files.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Modified => compare_modified(&a.modified_at, &b.modified_at),
            SortKey::Size => a.size.cmp(&b.size),
            SortKey::Name => compare_names(&a.name, &b.name),
        };
        direction.apply(ordering)
    });
}

/// Split a window over folders-then-files into one range per list.
fn split_window(window: Range<usize>, folder_count: usize) -> (Range<usize>, Range<usize>) {
    let folders = window.start.min(folder_count)..window.end.min(folder_count);
    let files = window.start.saturating_sub(folder_count)..window.end.saturating_sub(folder_count);
    (folders, files)
}

impl FilesystemScanner {
    /// One page of a directory as seen by `user`.
    ///
    /// Subdirectories the caller may not view are omitted; files are always
    /// listed. Folders precede files across page boundaries. Results are
    /// cached per path, user, page, and sort for the cache TTL.
    pub async fn list_directory(
        &self,
        path: &str,
        user: &User,
        page: u64,
        page_size: u64,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> AppResult<DirectoryListing> {
        let path = PathResolver::normalize_path(path);
        let request = PageRequest::new(page, page_size);
        let sort_key = SortKey::parse(sort_by);
        let direction = SortDirection::parse(sort_order);

        let cache_key = keys::listing(
            &path,
            user.id,
            request.page,
            request.page_size,
            &sort_key.to_string(),
            &direction.to_string(),
        );
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        self.store
            .resolver()
            .resolve_existing_directory(&path)
            .await?;
        let entries = self.store.list(&path).await.map_err(|e| match e.kind {
            ErrorKind::Storage => AppError::with_source(
                ErrorKind::InvalidPath,
                format!("Cannot read directory: {path}"),
                e,
            ),
            _ => e,
        })?;

        let policy = AccessPolicy::for_user(user);
        let mut folders = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            if entry.is_directory {
                let owner = self.path_owner(&entry.path).await?;
                if self.enforcer.can_view_path(&policy, &entry.path, owner.as_ref()) {
                    folders.push(self.build_folder_item(&entry, user, owner.as_ref()).await?);
                }
            } else if entry.is_file {
                files.push(self.build_file_item(&entry, user, &policy).await?);
            }
        }

        sort_folders(&mut folders, sort_key, direction);
        sort_files(&mut files, sort_key, direction);

        let total_items = (folders.len() + files.len()) as u64;
        let (folder_range, file_range) = split_window(request.window(total_items), folders.len());
        let can_write = self.has_write_access(user, &path);

        let listing = DirectoryListing {
            name: if path.is_empty() {
                ROOT_NAME.to_string()
            } else {
                PathResolver::get_name(&path)
            },
            parent_path: PathResolver::get_parent_path(&path),
            folders: folders[folder_range].to_vec(),
            files: files[file_range].to_vec(),
            total_items,
            page: request.page,
            page_size: request.page_size,
            total_pages: request.total_pages(total_items),
            has_more: request.has_more(total_items),
            etag: self.compute_directory_etag(&path).await,
            can_write,
            can_delete: can_write,
            can_create_folder: can_write,
            path,
        };

        debug!(
            path = %listing.path,
            user_id = user.id,
            total_items,
            "Listed directory"
        );
        self.cache.put(cache_key, listing.clone());
        Ok(listing)
    }

    async fn build_folder_item(
        &self,
        entry: &EntryMeta,
        user: &User,
        owner: Option<&User>,
    ) -> AppResult<FolderItem> {
        let id = self
            .stores
            .folders
            .find_by_path(&entry.path)
            .await?
            .map(|folder| folder.id);
        let folder_type = FolderKind::classify(&entry.path);
        let item_count = match self.store.list(&entry.path).await {
            Ok(children) => children.len() as i64,
            Err(e) => {
                warn!(path = %entry.path, error = %e, "Failed to count folder items");
                -1
            }
        };

        let can_write = self.has_write_access(user, &entry.path);
        let metadata = owner
            .map(|professor| FolderMetadata {
                professor_id: Some(professor.id),
                professor_name: Some(professor.display_name()),
                department_id: professor.department_id,
                is_own_folder: professor.id == user.id,
            })
            .unwrap_or_default();

        Ok(FolderItem {
            name: entry.name.clone(),
            path: entry.path.clone(),
            modified_at: entry.modified,
            id,
            folder_type,
            item_count,
            can_write,
            can_delete: can_write && !folder_type.is_system(),
            is_system_folder: folder_type.is_system(),
            metadata,
        })
    }

    async fn find_file_row(&self, entry: &EntryMeta) -> AppResult<Option<UploadedFile>> {
        if let Some(row) = self.stores.files.find_by_file_url(&entry.path).await? {
            return Ok(Some(row));
        }
        self.stores.files.find_by_stored_filename(&entry.name).await
    }

    async fn build_file_item(
        &self,
        entry: &EntryMeta,
        user: &User,
        policy: &AccessPolicy,
    ) -> AppResult<FileItem> {
        let row = self.find_file_row(entry).await?;
        let extension = mime::extension_of(&entry.name);
        let previewable = mime::is_previewable(&extension);

        let uploader_id = row.as_ref().and_then(|r| r.uploader_id);
        let uploader_name = match uploader_id {
            Some(id) => self
                .stores
                .users
                .find_by_id(id)
                .await?
                .map(|u| u.display_name()),
            None => None,
        };
        let can_delete = match uploader_id {
            Some(owner) => policy.can_delete(owner),
            None => self.has_write_access(user, &entry.path),
        };
        let id = row.as_ref().map(|r| r.id);

        Ok(FileItem {
            name: row
                .as_ref()
                .map(|r| r.original_filename.clone())
                .unwrap_or_else(|| entry.name.clone()),
            stored_name: entry.name.clone(),
            path: entry.path.clone(),
            size: entry.size,
            size_formatted: format_file_size(entry.size),
            mime_type: mime::mime_from_extension(&extension).to_string(),
            modified_at: entry.modified,
            uploaded_at: row.as_ref().map(|r| r.created_at),
            id,
            uploader_name,
            uploader_id,
            notes: row.as_ref().and_then(|r| r.notes.clone()),
            orphaned: row.is_none(),
            can_delete,
            can_replace: can_delete,
            previewable,
            download_url: id.map(download_url),
            preview_url: id.filter(|_| previewable).map(preview_url),
            extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use archive_entity::file::CreateUploadedFile;
    use archive_entity::user::UserRole;

    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_split_window() {
        assert_eq!(split_window(10..20, 15), (10..15, 0..5));
        assert_eq!(split_window(0..10, 15), (0..10, 0..0));
        assert_eq!(split_window(20..25, 15), (15..15, 5..10));
        assert_eq!(split_window(0..0, 0), (0..0, 0..0));
    }

    #[tokio::test]
    async fn test_pagination_folders_then_files() {
        let fx = Fixture::new().await;
        let admin = fx.user("Ada", "Admin", UserRole::Admin, None).await;
        for i in 0..15 {
            fx.store
                .resolver()
                .ensure_directory(&format!("misc/folder{i:02}"))
                .await
                .unwrap();
        }
        for i in 0..5 {
            fx.store
                .write(&format!("misc/file{i}.txt"), Bytes::from("x"))
                .await
                .unwrap();
        }

        let page = fx
            .scanner
            .list_directory("misc", &admin, 2, 10, None, None)
            .await
            .unwrap();
        let folder_names: Vec<_> = page.folders.iter().map(|f| f.name.as_str()).collect();
        let file_names: Vec<_> = page.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            folder_names,
            vec!["folder10", "folder11", "folder12", "folder13", "folder14"]
        );
        assert_eq!(
            file_names,
            vec!["file0.txt", "file1.txt", "file2.txt", "file3.txt", "file4.txt"]
        );
        assert_eq!(page.total_items, 20);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_more);

        let first = fx
            .scanner
            .list_directory("misc", &admin, 1, 10, None, None)
            .await
            .unwrap();
        assert_eq!(first.folders.len(), 10);
        assert!(first.files.is_empty());
        assert!(first.has_more);

        let beyond = fx
            .scanner
            .list_directory("misc", &admin, 5, 10, None, None)
            .await
            .unwrap();
        assert!(beyond.folders.is_empty() && beyond.files.is_empty());
    }

    #[tokio::test]
    async fn test_sorting() {
        let fx = Fixture::new().await;
        let admin = fx.user("Ada", "Admin", UserRole::Admin, None).await;
        fx.store.write("s/b.txt", Bytes::from("12345")).await.unwrap();
        fx.store.write("s/A.txt", Bytes::from("1")).await.unwrap();
        fx.store.write("s/c.txt", Bytes::from("123")).await.unwrap();

        let by_name = fx
            .scanner
            .list_directory("s", &admin, 1, 50, None, None)
            .await
            .unwrap();
        let names: Vec<_> = by_name.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A.txt", "b.txt", "c.txt"]);

        let by_size = fx
            .scanner
            .list_directory("s", &admin, 1, 50, Some("size"), Some("desc"))
            .await
            .unwrap();
        let sizes: Vec<_> = by_size.files.iter().map(|f| f.size).collect();
        assert_eq!(sizes, vec![5, 3, 1]);
    }

    #[tokio::test]
    async fn test_file_decoration_and_orphans() {
        let fx = Fixture::new().await;
        let john = fx
            .user("John", "Doe", UserRole::Professor, Some(fx.cs))
            .await;
        let dir = "2024-2025/first/John Doe/CS101 - Intro/Syllabus";
        fx.store
            .write(&format!("{dir}/stored.pdf"), Bytes::from("pdf"))
            .await
            .unwrap();
        fx.store
            .write(&format!("{dir}/stray.docx"), Bytes::from("doc"))
            .await
            .unwrap();
        let row = fx
            .stores
            .files
            .create(&CreateUploadedFile {
                original_filename: "syllabus.pdf".into(),
                stored_filename: "stored.pdf".into(),
                file_url: format!("{dir}/stored.pdf"),
                file_size: 3,
                file_type: Some("application/pdf".into()),
                uploader_id: john.id,
                document_submission_id: None,
                folder_id: None,
                file_order: None,
                notes: Some("week 1".into()),
            })
            .await
            .unwrap();

        let listing = fx
            .scanner
            .list_directory(dir, &john, 1, 50, None, None)
            .await
            .unwrap();
        assert_eq!(listing.name, "Syllabus");
        assert_eq!(listing.parent_path, "2024-2025/first/John Doe/CS101 - Intro");
        assert!(listing.can_write && listing.can_create_folder);

        let known = listing.files.iter().find(|f| f.stored_name == "stored.pdf").unwrap();
        assert_eq!(known.name, "syllabus.pdf");
        assert_eq!(known.id, Some(row.id));
        assert_eq!(known.uploader_name.as_deref(), Some("John Doe"));
        assert_eq!(known.notes.as_deref(), Some("week 1"));
        assert_eq!(known.mime_type, "application/pdf");
        assert!(!known.orphaned && known.can_delete && known.previewable);
        assert_eq!(known.download_url, Some(download_url(row.id)));
        assert_eq!(known.preview_url, Some(preview_url(row.id)));

        let stray = listing.files.iter().find(|f| f.stored_name == "stray.docx").unwrap();
        assert!(stray.orphaned);
        assert_eq!(stray.name, "stray.docx");
        assert!(stray.download_url.is_none() && stray.preview_url.is_none());
        // No row: deletion falls back to folder ownership.
        assert!(stray.can_delete);

        let dean = fx.user("Dina", "Dean", UserRole::Deanship, None).await;
        let as_dean = fx
            .scanner
            .list_directory(dir, &dean, 1, 50, None, None)
            .await
            .unwrap();
        assert!(as_dean.files.iter().all(|f| !f.can_delete));
        assert!(!as_dean.can_write);
    }

    #[tokio::test]
    async fn test_department_filtering_of_professor_folders() {
        let fx = Fixture::new().await;
        fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.user("Mona", "Math", UserRole::Professor, Some(fx.math)).await;
        fx.store.resolver().ensure_directory("2024-2025/first/John Doe").await.unwrap();
        fx.store.resolver().ensure_directory("2024-2025/first/Mona Math").await.unwrap();
        fx.store.resolver().ensure_directory("2024-2025/first/Ghost Prof").await.unwrap();

        let names = |listing: DirectoryListing| {
            listing
                .folders
                .into_iter()
                .map(|f| f.name)
                .collect::<Vec<_>>()
        };

        let hod = fx.user("Hana", "Head", UserRole::Hod, Some(fx.cs)).await;
        let listing = fx
            .scanner
            .list_directory("2024-2025/first", &hod, 1, 50, None, None)
            .await
            .unwrap();
        assert_eq!(listing.folders[0].metadata.professor_name.as_deref(), Some("John Doe"));
        assert!(listing.folders[0].is_system_folder);
        assert!(!listing.folders[0].can_delete);
        assert_eq!(names(listing), vec!["John Doe"]);
        assert_eq!(
            fx.audit.resources_of(hod.id),
            vec!["2024-2025/first/Ghost Prof", "2024-2025/first/Mona Math"]
        );

        let admin = fx.user("Ada", "Admin", UserRole::Admin, None).await;
        let listing = fx
            .scanner
            .list_directory("2024-2025/first", &admin, 1, 50, None, None)
            .await
            .unwrap();
        assert_eq!(names(listing), vec!["Ghost Prof", "John Doe", "Mona Math"]);

        let top = fx
            .scanner
            .list_directory("", &hod, 1, 50, None, None)
            .await
            .unwrap();
        assert_eq!(top.name, ROOT_NAME);
        assert_eq!(top.folders[0].folder_type, FolderKind::Year);
    }

    #[tokio::test]
    async fn test_listing_is_cached_until_invalidated() {
        let fx = Fixture::new().await;
        let admin = fx.user("Ada", "Admin", UserRole::Admin, None).await;
        fx.store.write("c/a.txt", Bytes::from("a")).await.unwrap();

        let first = fx
            .scanner
            .list_directory("c", &admin, 1, 50, None, None)
            .await
            .unwrap();
        fx.store.write("c/b.txt", Bytes::from("b")).await.unwrap();
        let cached = fx
            .scanner
            .list_directory("/c/", &admin, 1, 50, None, None)
            .await
            .unwrap();
        assert_eq!(first, cached);

        fx.scanner.invalidate_cache_recursive("c");
        let fresh = fx
            .scanner
            .list_directory("c", &admin, 1, 50, None, None)
            .await
            .unwrap();
        assert_eq!(fresh.files.len(), 2);
        assert_ne!(fresh.etag, first.etag);
    }

    #[tokio::test]
    async fn test_missing_and_hostile_paths() {
        let fx = Fixture::new().await;
        let admin = fx.user("Ada", "Admin", UserRole::Admin, None).await;

        let err = fx
            .scanner
            .list_directory("nope", &admin, 1, 50, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);

        let err = fx
            .scanner
            .list_directory("../outside", &admin, 1, 50, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathTraversal);
    }
}
