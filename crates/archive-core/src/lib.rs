//! # archive-core
//!
//! Core crate for the academic archive. Contains configuration schemas,
//! pagination/sorting types shared by the listing APIs, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other archive crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
