//! Document submission entities.

pub mod document_type;
pub mod model;

pub use document_type::DocumentType;
pub use model::{CreateSubmission, DocumentSubmission, SubmissionStatus};
