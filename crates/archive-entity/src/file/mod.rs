//! Uploaded file entities.

pub mod model;

pub use model::{CreateUploadedFile, UploadedFile};
