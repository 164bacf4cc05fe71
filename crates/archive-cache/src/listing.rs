//! Listing and ETag cache shared by every scanner instance.

use std::time::Duration;

use tracing::debug;

use archive_entity::listing::DirectoryListing;

use crate::keys;
use crate::ttl::TtlCache;

/// Lifetime of cached listings and ETags.
pub const LISTING_TTL: Duration = Duration::from_secs(15);

/// Two TTL maps: paginated listings keyed by [`keys::listing`], and ETags
/// keyed by the normalized directory path.
#[derive(Debug)]
pub struct ListingCache {
    listings: TtlCache<DirectoryListing>,
    etags: TtlCache<String>,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingCache {
    /// Create a cache with the standard TTL.
    pub fn new() -> Self {
        Self::with_ttl(LISTING_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            listings: TtlCache::new(ttl),
            etags: TtlCache::new(ttl),
        }
    }

    /// Cached listing for `key`, if still fresh.
    pub fn get(&self, key: &str) -> Option<DirectoryListing> {
        let hit = self.listings.get(key);
        debug!(key, hit = hit.is_some(), "Listing cache lookup");
        hit
    }

    /// Store a listing.
    pub fn put(&self, key: impl Into<String>, listing: DirectoryListing) {
        self.listings.insert(key, listing);
    }

    /// Cached ETag for a directory, if still fresh.
    pub fn get_etag(&self, path: &str) -> Option<String> {
        self.etags.get(path)
    }

    /// Store an ETag.
    pub fn put_etag(&self, path: &str, etag: impl Into<String>) {
        self.etags.insert(path, etag.into());
    }

    /// Drop every listing of `path` and its ETag.
    pub fn invalidate(&self, path: &str) {
        let removed = self.listings.remove_prefix(&keys::listing_prefix(path));
        self.etags.remove(path);
        debug!(path, removed, "Invalidated listing cache");
    }

    /// Invalidate `path`, each of its ancestors, and the root.
    pub fn invalidate_recursive(&self, path: &str) {
        let mut current = path;
        while !current.is_empty() {
            self.invalidate(current);
            current = keys::parent_of(current);
        }
        self.invalidate("");
    }

    /// Drop everything.
    pub fn invalidate_all(&self) {
        self.listings.clear();
        self.etags.clear();
        debug!("Cleared listing cache");
    }
}
