//! Cache key builders for listing and ETag entries.
//!
//! Listing keys start with the directory path followed by `:`, so every
//! listing of one directory shares the prefix returned by [`listing_prefix`].

/// Cache key for one page of a directory listing as seen by one user.
pub fn listing(
    path: &str,
    user_id: i64,
    page: u64,
    page_size: u64,
    sort_by: &str,
    sort_order: &str,
) -> String {
    format!("{path}:{user_id}:{page}:{page_size}:{sort_by}:{sort_order}")
}

/// Prefix shared by every listing key of `path`.
pub fn listing_prefix(path: &str) -> String {
    format!("{path}:")
}

/// Parent of a normalized path (`""` for first-level paths and the root).
pub fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}
