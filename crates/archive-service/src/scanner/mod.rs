//! Physical directory browsing: listings, ETags, and lazy trees.
//!
//! The scanner reads the upload tree through [`LocalStore`], decorates
//! entries with database metadata, filters directories through the caller's
//! [`AccessPolicy`](archive_auth::AccessPolicy), and caches listings and
//! ETags in a shared [`ListingCache`].

pub mod etag;
pub mod listing;
pub mod tree;

use std::sync::Arc;

use archive_auth::{AccessEnforcer, AccessPolicy};
use archive_cache::ListingCache;
use archive_core::result::AppResult;
use archive_database::Stores;
use archive_entity::user::User;
use archive_storage::{LocalStore, PathResolver};

use crate::identity::{self, IdentityResolver};

/// Lists, fingerprints, and walks the physical upload tree.
#[derive(Debug, Clone)]
pub struct FilesystemScanner {
    /// Byte storage confined to the upload root.
    store: LocalStore,
    /// Listing and ETag cache.
    cache: Arc<ListingCache>,
    /// Metadata stores.
    stores: Stores,
    /// Professor segment resolution.
    identity: IdentityResolver,
    /// Audits directories hidden from the caller.
    enforcer: AccessEnforcer,
}

impl FilesystemScanner {
    /// Creates a new scanner.
    pub fn new(
        store: LocalStore,
        cache: Arc<ListingCache>,
        stores: Stores,
        enforcer: AccessEnforcer,
    ) -> Self {
        let identity = IdentityResolver::new(stores.users.clone());
        Self {
            store,
            cache,
            stores,
            identity,
            enforcer,
        }
    }

    /// The shared listing cache.
    pub fn cache(&self) -> &Arc<ListingCache> {
        &self.cache
    }

    /// Drop every cached listing of `path` and its ETag.
    pub fn invalidate_cache(&self, path: &str) {
        self.cache.invalidate(&PathResolver::normalize_path(path));
    }

    /// Invalidate `path`, each of its ancestors, and the root.
    pub fn invalidate_cache_recursive(&self, path: &str) {
        self.cache
            .invalidate_recursive(&PathResolver::normalize_path(path));
    }

    /// Drop every cached listing and ETag.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Whether anything exists at `path`. Invalid paths do not exist.
    pub async fn path_exists(&self, path: &str) -> bool {
        self.store.exists(path).await.unwrap_or(false)
    }

    /// Whether `path` is an existing directory.
    pub async fn is_directory(&self, path: &str) -> bool {
        self.store
            .metadata(path)
            .await
            .map(|meta| meta.is_directory)
            .unwrap_or(false)
    }

    /// Write access to a directory: the owning professor only.
    fn has_write_access(&self, user: &User, path: &str) -> bool {
        let policy = AccessPolicy::for_user(user);
        policy.can_write(user.id) && identity::owns_path(user, path)
    }

    /// Professor owning the folder `path` lies in, when at or below the
    /// professor level and resolvable.
    async fn path_owner(&self, path: &str) -> AppResult<Option<User>> {
        match path.split('/').filter(|s| !s.is_empty()).nth(2) {
            Some(segment) => self.identity.find(segment).await,
            None => Ok(None),
        }
    }
}

/// Human-readable size: bytes below 1 KiB, otherwise one decimal.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < MB {
        format!("{:.1} KB", size / KB)
    } else if size < GB {
        format!("{:.1} MB", size / MB)
    } else {
        format!("{:.1} GB", size / GB)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[tokio::test]
    async fn test_path_exists_and_is_directory() {
        let fx = Fixture::new().await;
        fx.store.write("a/b.txt", Bytes::from("x")).await.unwrap();

        assert!(fx.scanner.path_exists("a/b.txt").await);
        assert!(fx.scanner.is_directory("a").await);
        assert!(!fx.scanner.is_directory("a/b.txt").await);
        assert!(!fx.scanner.path_exists("../etc/passwd").await);
        assert!(!fx.scanner.is_directory("missing").await);
    }
}
