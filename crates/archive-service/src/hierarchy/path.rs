//! Logical hierarchy paths: `/{year}/{semester}/{professor}/{course}/{document type}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use archive_core::error::AppError;
use archive_core::result::AppResult;
use archive_entity::academic::{AcademicYear, Course, SemesterType};
use archive_entity::node::NodeType;
use archive_entity::submission::DocumentType;
use archive_entity::user::User;

use crate::identity::generate_professor_folder_name;

/// Maximum number of components.
const MAX_DEPTH: usize = 5;

/// A parsed logical path. Each level is present only if every level above
/// it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyPath {
    /// Academic year code.
    pub year_code: Option<String>,
    /// Semester.
    pub semester: Option<SemesterType>,
    /// Professor segment (generated name, `prof_<id>`, or legacy tag).
    pub professor: Option<String>,
    /// Course code.
    pub course_code: Option<String>,
    /// Document type segment as written.
    pub document_type: Option<String>,
}

impl HierarchyPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a logical path. Leading, trailing, and repeated slashes are
    /// ignored.
    pub fn parse(path: &str) -> AppResult<Self> {
        let parts: Vec<&str> = path
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        if parts.len() > MAX_DEPTH {
            return Err(AppError::invalid_path(format!(
                "Hierarchy path has more than {MAX_DEPTH} levels: '{path}'"
            )));
        }

        Ok(Self {
            year_code: parts.first().map(|s| s.to_string()),
            semester: parts.get(1).map(|s| s.parse()).transpose()?,
            professor: parts.get(2).map(|s| s.to_string()),
            course_code: parts.get(3).map(|s| s.to_string()),
            document_type: parts.get(4).map(|s| s.to_string()),
        })
    }

    /// Path of a document-type node built from its entities.
    pub fn for_document(
        year: &AcademicYear,
        semester: SemesterType,
        professor: &User,
        course: &Course,
        document_type: DocumentType,
    ) -> Self {
        Self {
            year_code: Some(year.year_code.clone()),
            semester: Some(semester),
            professor: Some(generate_professor_folder_name(professor)),
            course_code: Some(course.course_code.clone()),
            document_type: Some(document_type.url_segment().to_string()),
        }
    }

    /// Components in order.
    pub fn segments(&self) -> Vec<String> {
        [
            self.year_code.clone(),
            self.semester.map(|s| s.as_segment().to_string()),
            self.professor.clone(),
            self.course_code.clone(),
            self.document_type.clone(),
        ]
        .into_iter()
        .map_while(|segment| segment)
        .collect()
    }

    /// Number of components.
    pub fn depth(&self) -> usize {
        self.segments().len()
    }

    /// Level of the node this path addresses.
    pub fn node_type(&self) -> NodeType {
        NodeType::from_depth(self.depth()).unwrap_or(NodeType::DocumentType)
    }

    /// The path truncated to its first `depth` components.
    pub fn truncate(&self, depth: usize) -> Self {
        Self {
            year_code: self.year_code.clone().filter(|_| depth >= 1),
            semester: self.semester.filter(|_| depth >= 2),
            professor: self.professor.clone().filter(|_| depth >= 3),
            course_code: self.course_code.clone().filter(|_| depth >= 4),
            document_type: self.document_type.clone().filter(|_| depth >= 5),
        }
    }

    /// The standard document type named by the last segment, if any.
    pub fn parsed_document_type(&self) -> Option<DocumentType> {
        self.document_type
            .as_deref()
            .and_then(DocumentType::from_segment)
    }

    /// Logical path with a leading slash (`/` for the root).
    pub fn build(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}
