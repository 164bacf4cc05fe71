//! Pagination types for directory listings.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 50;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 500;

/// Request parameters for paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request, clamping out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.page_size
    }

    /// Items per page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Number of pages needed for `total_items` (0 when empty).
    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.page_size)
    }

    /// Whether pages follow this one.
    pub fn has_more(&self, total_items: u64) -> bool {
        self.page < self.total_pages(total_items)
    }

    /// Index range of this page over a combined sequence of `total_items`.
    ///
    /// Pages past the end yield an empty range.
    pub fn window(&self, total_items: u64) -> Range<usize> {
        let start = self.offset().min(total_items) as usize;
        let end = (self.offset() + self.page_size).min(total_items) as usize;
        start..end
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
