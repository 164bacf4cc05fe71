//! Concurrent map whose entries expire after a fixed time-to-live.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// String-keyed cache with per-entry expiry checked on read.
///
/// There is no background eviction: an expired entry is removed the next
/// time it is looked up, or by one of the bulk removal methods.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Return a live entry, dropping it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    /// Insert or replace an entry.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Remove one entry.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Remove every entry whose key starts with `prefix`. Returns the count.
    pub fn remove_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before.saturating_sub(self.entries.len())
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_lazily() {
        let cache = TtlCache::new(Duration::from_secs(15));
        cache.insert("a", 1);

        tokio::time::advance(Duration::from_secs(14)).await;
        assert_eq!(cache.get("a"), Some(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reinsert_refreshes_expiry() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.insert("a", 1);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.insert("a", 2);
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("a"), Some(2));
    }

    #[test]
    fn test_remove_prefix() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a/b:1", 1);
        cache.insert("a/b:2", 2);
        cache.insert("a/bc:1", 3);
        assert_eq!(cache.remove_prefix("a/b:"), 2);
        assert_eq!(cache.get("a/bc:1"), Some(3));
    }
}
