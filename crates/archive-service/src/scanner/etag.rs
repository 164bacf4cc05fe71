//! Weak ETags over a directory's immediate contents.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use archive_core::result::AppResult;
use archive_storage::PathResolver;

use super::FilesystemScanner;

/// Hex characters kept from the digest.
const ETAG_LENGTH: usize = 12;

/// ETag of a directory that does not exist.
pub const NOT_FOUND_ETAG: &str = "W/\"not-found\"";

impl FilesystemScanner {
    /// Weak ETag of a directory: `W/"<12 hex>"` over the directory's own
    /// modification time and the name, size, and modification time of each
    /// immediate child.
    ///
    /// Never fails: a missing directory yields `W/"not-found"` and an IO
    /// failure `W/"error-<epoch millis>"`. Failure values are not cached.
    pub async fn compute_directory_etag(&self, path: &str) -> String {
        let path = PathResolver::normalize_path(path);
        if let Some(etag) = self.cache.get_etag(&path) {
            debug!(path = %path, "ETag cache hit");
            return etag;
        }

        if self
            .store
            .resolver()
            .resolve_existing_directory(&path)
            .await
            .is_err()
        {
            return NOT_FOUND_ETAG.to_string();
        }

        match self.fingerprint(&path).await {
            Ok(content) => {
                let digest = hex::encode(Sha256::digest(content.as_bytes()));
                let etag = format!("W/\"{}\"", &digest[..ETAG_LENGTH]);
                self.cache.put_etag(&path, etag.clone());
                etag
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to compute directory ETag");
                format!("W/\"error-{}\"", Utc::now().timestamp_millis())
            }
        }
    }

    /// Whether the directory no longer matches `etag`. An empty tag always
    /// counts as changed.
    pub async fn has_directory_changed(&self, path: &str, etag: &str) -> bool {
        if etag.is_empty() {
            return true;
        }
        self.compute_directory_etag(path).await != etag
    }

    async fn fingerprint(&self, path: &str) -> AppResult<String> {
        let directory = self.store.metadata(path).await?;
        let mut entries = self.store.list(path).await?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut content = format!("{}|", directory.modified_millis());
        for entry in &entries {
            content.push_str(&format!(
                "{}:{}:{};",
                entry.name,
                entry.size,
                entry.modified_millis()
            ));
        }
        Ok(content)
    }
}
