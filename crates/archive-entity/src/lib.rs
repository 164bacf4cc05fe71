//! # archive-entity
//!
//! Domain entity models for the academic archive. Every struct in this crate
//! represents a database table row, a domain value object, or a transient
//! view model built per request (nodes, listings, trees). Database entities
//! derive `sqlx::FromRow`; everything derives `Serialize`.

pub mod academic;
pub mod file;
pub mod folder;
pub mod listing;
pub mod node;
pub mod submission;
pub mod user;
