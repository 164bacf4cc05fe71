//! # archive-auth
//!
//! Authorization for the academic archive.
//!
//! ## Modules
//!
//! - `policy`: role polymorphic [`AccessPolicy`], the [`AccessEnforcer`]
//!   that converts refusals into errors, and the [`AuditSink`] that records
//!   them

pub mod policy;

pub use policy::{AccessEnforcer, AccessPolicy, AuditSink, FileOwner, TracingAuditSink};
