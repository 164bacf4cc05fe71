//! # archive-storage
//!
//! Physical storage for the academic archive: the [`PathResolver`] that
//! confines every path to the upload root, the [`LocalStore`] that reads and
//! writes bytes through it, and extension-based content type helpers.

pub mod local;
pub mod mime;
pub mod resolver;

pub use local::{EntryMeta, LocalStore};
pub use resolver::PathResolver;
