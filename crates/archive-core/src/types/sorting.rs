//! Sorting types for directory listings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Parse a direction leniently; anything but `desc` is ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    /// Apply this direction to an ascending ordering.
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Field a directory listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Case-insensitive name.
    #[default]
    Name,
    /// Last modification time.
    Modified,
    /// Size in bytes (files only; folders fall back to name).
    Size,
}

impl SortKey {
    /// Parse a sort key leniently; unknown keys sort by name.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.to_lowercase()).as_deref() {
            Some("modified") | Some("modifiedat") => Self::Modified,
            Some("size") => Self::Size,
            _ => Self::Name,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Modified => write!(f, "modified"),
            Self::Size => write!(f, "size"),
        }
    }
}
