//! Academic reference data repository.

use async_trait::async_trait;
use sqlx::PgPool;

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;
use archive_entity::academic::{AcademicYear, Course, CourseAssignment, Semester, SemesterType};

use crate::store::AcademicStore;

/// Repository for years, semesters, courses, and assignments.
#[derive(Debug, Clone)]
pub struct AcademicRepository {
    pool: PgPool,
}

impl AcademicRepository {
    /// Create a new academic repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AcademicStore for AcademicRepository {
    async fn find_year(&self, id: i64) -> AppResult<Option<AcademicYear>> {
        sqlx::query_as::<_, AcademicYear>("SELECT * FROM academic_years WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find year", e))
    }

    async fn find_year_by_code(&self, year_code: &str) -> AppResult<Option<AcademicYear>> {
        sqlx::query_as::<_, AcademicYear>("SELECT * FROM academic_years WHERE year_code = $1")
            .bind(year_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find year by code", e)
            })
    }

    async fn list_active_years(&self) -> AppResult<Vec<AcademicYear>> {
        sqlx::query_as::<_, AcademicYear>(
            "SELECT * FROM academic_years WHERE is_active = TRUE ORDER BY year_code DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list years", e))
    }

    async fn find_semester(&self, id: i64) -> AppResult<Option<Semester>> {
        sqlx::query_as::<_, Semester>("SELECT * FROM semesters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find semester", e))
    }

    async fn find_semester_by_type(
        &self,
        academic_year_id: i64,
        semester_type: SemesterType,
    ) -> AppResult<Option<Semester>> {
        sqlx::query_as::<_, Semester>(
            "SELECT * FROM semesters WHERE academic_year_id = $1 AND semester_type = $2",
        )
        .bind(academic_year_id)
        .bind(semester_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find semester", e))
    }

    async fn list_semesters(&self, academic_year_id: i64) -> AppResult<Vec<Semester>> {
        // Enum order is declaration order: first, second, summer.
        sqlx::query_as::<_, Semester>(
            "SELECT * FROM semesters WHERE academic_year_id = $1 ORDER BY semester_type ASC",
        )
        .bind(academic_year_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list semesters", e))
    }

    async fn find_course(&self, id: i64) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find course", e))
    }

    async fn find_course_by_code(&self, course_code: &str) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE course_code = $1")
            .bind(course_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find course by code", e)
            })
    }

    async fn find_assignment(&self, id: i64) -> AppResult<Option<CourseAssignment>> {
        sqlx::query_as::<_, CourseAssignment>("SELECT * FROM course_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find assignment", e)
            })
    }

    async fn find_assignment_for(
        &self,
        semester_id: i64,
        course_id: i64,
        professor_id: i64,
    ) -> AppResult<Option<CourseAssignment>> {
        sqlx::query_as::<_, CourseAssignment>(
            "SELECT * FROM course_assignments \
             WHERE semester_id = $1 AND course_id = $2 AND professor_id = $3",
        )
        .bind(semester_id)
        .bind(course_id)
        .bind(professor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find assignment", e))
    }

    async fn list_assignments(
        &self,
        semester_id: i64,
        professor_id: i64,
    ) -> AppResult<Vec<CourseAssignment>> {
        sqlx::query_as::<_, CourseAssignment>(
            "SELECT ca.* FROM course_assignments ca \
             INNER JOIN courses c ON c.id = ca.course_id \
             WHERE ca.semester_id = $1 AND ca.professor_id = $2 AND ca.is_active = TRUE \
             ORDER BY c.course_name ASC",
        )
        .bind(semester_id)
        .bind(professor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list assignments", e))
    }
}
