//! Academic reference data: years, semesters, courses, and assignments.

pub mod course;
pub mod semester;
pub mod year;

pub use course::{Course, CourseAssignment};
pub use semester::{Semester, SemesterType};
pub use year::AcademicYear;
