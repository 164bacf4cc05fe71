//! Semester entity and semester type enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The three semesters of an academic year.
///
/// Variant order is the display order used when listing a year's semesters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "semester_type", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemesterType {
    /// Fall semester.
    First,
    /// Spring semester.
    Second,
    /// Summer session.
    Summer,
}

impl SemesterType {
    /// Lowercase path segment (`first`, `second`, `summer`).
    pub fn as_segment(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Summer => "summer",
        }
    }

    /// Human-readable name used in nodes and breadcrumbs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::First => "First Semester",
            Self::Second => "Second Semester",
            Self::Summer => "Summer Semester",
        }
    }
}

impl fmt::Display for SemesterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_segment())
    }
}

impl FromStr for SemesterType {
    type Err = archive_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "second" => Ok(Self::Second),
            "summer" => Ok(Self::Summer),
            _ => Err(archive_core::AppError::invalid_path(format!(
                "Invalid semester type: '{s}'. Expected one of: first, second, summer"
            ))),
        }
    }
}

/// A semester belonging to one academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Semester {
    /// Unique identifier.
    pub id: i64,
    /// Owning academic year.
    pub academic_year_id: i64,
    /// Which semester of the year this is.
    pub semester_type: SemesterType,
    /// Whether the semester is currently open.
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_round_trip() {
        for ty in [SemesterType::First, SemesterType::Second, SemesterType::Summer] {
            assert_eq!(ty.as_segment().parse::<SemesterType>().unwrap(), ty);
        }
        assert_eq!("FIRST".parse::<SemesterType>().unwrap(), SemesterType::First);
        assert!("winter".parse::<SemesterType>().is_err());
    }

    #[test]
    fn test_display_order() {
        let mut types = vec![SemesterType::Summer, SemesterType::First, SemesterType::Second];
        types.sort();
        assert_eq!(
            types,
            vec![SemesterType::First, SemesterType::Second, SemesterType::Summer]
        );
    }
}
