//! # archive-database
//!
//! Store traits for the academic archive, their PostgreSQL repository
//! implementations, an in-memory implementation for tests and tooling, and
//! connection and migration management.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use store::{
    AcademicStore, FileStore, FolderStore, StoreTransaction, Stores, SubmissionStore,
    TransactionStore, UserStore,
};
