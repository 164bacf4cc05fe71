//! # archive-cache
//!
//! In-process cache for directory listings and directory ETags. Entries
//! expire [`LISTING_TTL`] after insertion; expiry is checked when an entry is
//! read, so the cache needs no background task.

pub mod keys;
pub mod listing;
pub mod ttl;

pub use listing::{LISTING_TTL, ListingCache};
pub use ttl::TtlCache;
