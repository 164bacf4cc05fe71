//! Course and course-assignment entities.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    /// Unique identifier.
    pub id: i64,
    /// Unique course code, e.g. `CS101`.
    pub course_code: String,
    /// Course title, e.g. `Database Systems`.
    pub course_name: String,
    /// Owning department.
    pub department_id: Option<i64>,
}

impl Course {
    /// Physical folder name: `"{code} - {name}"`.
    pub fn folder_name(&self) -> String {
        format!("{} - {}", self.course_code, self.course_name)
    }
}

/// Binds a course to a professor for one semester.
///
/// Course-level folders only exist relative to an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CourseAssignment {
    /// Unique identifier.
    pub id: i64,
    /// Semester the course is taught in.
    pub semester_id: i64,
    /// The course being taught.
    pub course_id: i64,
    /// The teaching professor.
    pub professor_id: i64,
    /// Whether the assignment is current.
    pub is_active: bool,
}
