//! The logical five-level hierarchy: year, semester, professor, course, and
//! document type.

pub mod navigator;
pub mod path;

pub use navigator::HierarchyNavigator;
pub use path::HierarchyPath;
