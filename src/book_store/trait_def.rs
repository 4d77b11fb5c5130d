//! BookStore trait definition.
//!
//! This trait is the single operation contract shared by the remote-style
//! SQLite backend and the guest device-local backend, so everything above
//! the gateway stays backend-agnostic.

use super::models::{Book, BookDraft, BookPatch, Catalog, CatalogPatch};
use thiserror::Error;

/// Errors surfaced by storage backends.
///
/// `NotFound` covers both genuinely absent records and, on the owner-scoped
/// backend, records belonging to a different identity.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for book/catalog storage backends.
///
/// Every operation is scoped by the acting owner; the SQLite backend keys
/// all mutations by record id AND owner, the local backend is single-guest
/// by construction and ignores the owner value.
pub trait BookStore: Send + Sync {
    // =========================================================================
    // Catalogs
    // =========================================================================

    /// List the owner's catalogs, oldest first.
    fn get_catalogs(&self, owner: Option<&str>) -> StoreResult<Vec<Catalog>>;

    /// Create a catalog and return the stored record.
    fn create_catalog(
        &self,
        owner: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Catalog>;

    /// Update a catalog's display fields. Returns the updated record.
    fn update_catalog(
        &self,
        owner: Option<&str>,
        catalog_id: &str,
        patch: &CatalogPatch,
    ) -> StoreResult<Catalog>;

    /// Delete a catalog. Unconditional; the caller is responsible for the
    /// "never delete the last catalog" rule.
    fn delete_catalog(&self, owner: Option<&str>, catalog_id: &str) -> StoreResult<()>;

    // =========================================================================
    // Books
    // =========================================================================

    /// List the books of a catalog, newest first.
    fn get_books(&self, owner: Option<&str>, catalog_id: &str) -> StoreResult<Vec<Book>>;

    /// Insert a new book record from a draft. Returns the stored record.
    fn insert_book(
        &self,
        owner: Option<&str>,
        catalog_id: &str,
        draft: &BookDraft,
    ) -> StoreResult<Book>;

    /// Get a book by id. Returns Ok(None) if the book does not exist
    /// (or is not owned by the acting identity).
    fn get_book_by_id(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Option<Book>>;

    /// Apply a partial edit. Always marks the record manually edited.
    fn update_book(
        &self,
        owner: Option<&str>,
        book_id: &str,
        patch: &BookPatch,
    ) -> StoreResult<Book>;

    /// Delete a book by id.
    fn delete_book(&self, owner: Option<&str>, book_id: &str) -> StoreResult<()>;

    /// Flip the favorite flag. Returns the updated record.
    fn toggle_favorite(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Book>;

    /// Flip the read flag. Returns the updated record.
    fn toggle_read(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Book>;
}
