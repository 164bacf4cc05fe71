//! Standard document types and their path/display mappings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four standard document types of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// Course syllabus.
    Syllabus,
    /// Exam papers.
    Exam,
    /// Lecture/course notes.
    LectureNotes,
    /// Assignments.
    Assignment,
}

impl DocumentType {
    /// All types in the order their folders are provisioned.
    pub const ALL: [DocumentType; 4] = [
        Self::Syllabus,
        Self::Exam,
        Self::LectureNotes,
        Self::Assignment,
    ];

    /// Physical folder name.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::Syllabus => "Syllabus",
            Self::Exam => "Exams",
            Self::LectureNotes => "Course Notes",
            Self::Assignment => "Assignments",
        }
    }

    /// Canonical logical path segment.
    pub fn url_segment(&self) -> &'static str {
        match self {
            Self::Syllabus => "syllabus",
            Self::Exam => "exams",
            Self::LectureNotes => "course_notes",
            Self::Assignment => "assignments",
        }
    }

    /// Parse a logical path segment, accepting legacy aliases.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.to_lowercase().replace('-', "_").as_str() {
            "syllabus" => Some(Self::Syllabus),
            "exams" | "exam" => Some(Self::Exam),
            "course_notes" | "lecture_notes" => Some(Self::LectureNotes),
            "assignments" | "assignment" => Some(Self::Assignment),
            _ => None,
        }
    }

    /// Map a physical folder name back to its type.
    pub fn from_folder_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.folder_name().eq_ignore_ascii_case(name))
            .or_else(|| Self::from_segment(&name.replace(' ', "_")))
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder_name())
    }
}

impl FromStr for DocumentType {
    type Err = archive_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_segment(s).ok_or_else(|| {
            archive_core::AppError::invalid_path(format!("Unknown document type: '{s}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_aliases() {
        assert_eq!(DocumentType::from_segment("exam"), Some(DocumentType::Exam));
        assert_eq!(DocumentType::from_segment("Exams"), Some(DocumentType::Exam));
        assert_eq!(
            DocumentType::from_segment("lecture_notes"),
            Some(DocumentType::LectureNotes)
        );
        assert_eq!(
            DocumentType::from_segment("course-notes"),
            Some(DocumentType::LectureNotes)
        );
        assert_eq!(DocumentType::from_segment("lab"), None);
    }

    #[test]
    fn test_folder_name_round_trip() {
        for ty in DocumentType::ALL {
            assert_eq!(DocumentType::from_folder_name(ty.folder_name()), Some(ty));
            assert_eq!(DocumentType::from_segment(ty.url_segment()), Some(ty));
        }
        assert_eq!(DocumentType::from_folder_name("Lab Reports"), None);
    }
}
