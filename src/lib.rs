//! Shelfmark catalog server library.
//!
//! Exposes the internal modules for integration tests and reuse.

pub mod book_store;
pub mod config;
pub mod enrichment;
pub mod filtering;
pub mod interchange;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use book_store::{BookService, BookStore, LocalBookStore, SqliteBookStore};
pub use interchange::ImportResult;
pub use server::{run_server, RequestsLoggingLevel};
