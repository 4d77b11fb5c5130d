//! The persistence gateway.
//!
//! `BookService` is the single entry point for catalog/book operations.
//! Backend selection happens per call: a present user identity routes to
//! the SQLite store, its absence routes to the guest device store. Both
//! backends implement the same `BookStore` contract, so everything above
//! this point is backend-agnostic.

use super::models::{Book, BookDraft, BookPatch, Catalog, CatalogPatch};
use super::trait_def::{BookStore, StoreResult};
use crate::enrichment::MetadataProvider;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name given to the catalog synthesized for a fresh identity.
pub const DEFAULT_CATALOG_NAME: &str = "My Book Catalog";

pub struct BookService {
    remote: Arc<dyn BookStore>,
    local: Arc<dyn BookStore>,
    metadata: Arc<dyn MetadataProvider>,
}

/// Outcome of a commit phase: how many drafts were persisted and how many
/// failed. Failures never abort the remaining inserts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CommitOutcome {
    pub imported: usize,
    pub failed: usize,
}

impl BookService {
    pub fn new(
        remote: Arc<dyn BookStore>,
        local: Arc<dyn BookStore>,
        metadata: Arc<dyn MetadataProvider>,
    ) -> Self {
        BookService {
            remote,
            local,
            metadata,
        }
    }

    fn store_for(&self, owner: Option<&str>) -> &dyn BookStore {
        match owner {
            Some(_) => self.remote.as_ref(),
            None => self.local.as_ref(),
        }
    }

    // =========================================================================
    // Catalogs
    // =========================================================================

    /// List catalogs, synthesizing and persisting a default one when the
    /// identity has none, so the caller is never left without a selectable
    /// catalog.
    pub fn get_catalogs(&self, owner: Option<&str>) -> StoreResult<Vec<Catalog>> {
        let store = self.store_for(owner);
        let catalogs = store.get_catalogs(owner)?;
        if catalogs.is_empty() {
            let default = store.create_catalog(owner, DEFAULT_CATALOG_NAME, None)?;
            return Ok(vec![default]);
        }
        Ok(catalogs)
    }

    pub fn create_catalog(
        &self,
        owner: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Catalog> {
        self.store_for(owner).create_catalog(owner, name, description)
    }

    pub fn update_catalog(
        &self,
        owner: Option<&str>,
        catalog_id: &str,
        patch: &CatalogPatch,
    ) -> StoreResult<Catalog> {
        self.store_for(owner).update_catalog(owner, catalog_id, patch)
    }

    pub fn delete_catalog(&self, owner: Option<&str>, catalog_id: &str) -> StoreResult<()> {
        self.store_for(owner).delete_catalog(owner, catalog_id)
    }

    // =========================================================================
    // Books
    // =========================================================================

    pub fn get_books(&self, owner: Option<&str>, catalog_id: &str) -> StoreResult<Vec<Book>> {
        self.store_for(owner).get_books(owner, catalog_id)
    }

    /// Add a book, optionally enriching it first.
    ///
    /// Enrichment only runs when requested and the caller supplied no cover
    /// image; caller-supplied values always win over looked-up ones, and a
    /// failed lookup degrades to inserting the draft as-is.
    pub async fn add_book(
        &self,
        owner: Option<&str>,
        catalog_id: &str,
        draft: &BookDraft,
        auto_enrich: bool,
    ) -> StoreResult<Book> {
        let mut final_draft = draft.clone();

        if auto_enrich && draft.cover_image_url.is_none() && !cfg!(feature = "no_enrichment") {
            match self.metadata.lookup(&draft.title, &draft.author).await {
                Ok(found) => {
                    debug!("Enriched \"{}\" by {}", draft.title, draft.author);
                    final_draft.genre = draft.genre.clone().or(found.genre);
                    final_draft.holiday_category =
                        draft.holiday_category.clone().or(found.holiday_category);
                    final_draft.cover_image_url =
                        draft.cover_image_url.clone().or(found.cover_image_url);
                    final_draft.isbn = draft.isbn.clone().or(found.isbn);
                    final_draft.publication_year =
                        draft.publication_year.or(found.publication_year);
                    final_draft.description = draft.description.clone().or(found.description);
                }
                Err(err) => {
                    warn!(
                        "Metadata lookup failed for \"{}\" by {}: {:#}",
                        draft.title, draft.author, err
                    );
                }
            }
        }

        self.store_for(owner).insert_book(owner, catalog_id, &final_draft)
    }

    pub fn get_book_by_id(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Option<Book>> {
        self.store_for(owner).get_book_by_id(owner, book_id)
    }

    pub fn update_book(
        &self,
        owner: Option<&str>,
        book_id: &str,
        patch: &BookPatch,
    ) -> StoreResult<Book> {
        self.store_for(owner).update_book(owner, book_id, patch)
    }

    pub fn delete_book(&self, owner: Option<&str>, book_id: &str) -> StoreResult<()> {
        self.store_for(owner).delete_book(owner, book_id)
    }

    pub fn toggle_favorite(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Book> {
        self.store_for(owner).toggle_favorite(owner, book_id)
    }

    pub fn toggle_read(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Book> {
        self.store_for(owner).toggle_read(owner, book_id)
    }

    // =========================================================================
    // Import commit
    // =========================================================================

    /// Persist previously previewed drafts one at a time, in source order.
    ///
    /// Imported rows already carry their data, so enrichment is skipped. A
    /// single record's failure is logged and counted, and the remaining
    /// records still go in; a partially imported catalog is an accepted
    /// outcome.
    pub async fn commit_import(
        &self,
        owner: Option<&str>,
        catalog_id: &str,
        drafts: &[BookDraft],
    ) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();
        for draft in drafts {
            match self.add_book(owner, catalog_id, draft, false).await {
                Ok(_) => outcome.imported += 1,
                Err(err) => {
                    warn!(
                        "Failed to import \"{}\" by {}: {:#}",
                        draft.title,
                        draft.author,
                        anyhow::Error::from(err)
                    );
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_store::{LocalBookStore, SqliteBookStore};
    use crate::enrichment::{BookMetadata, NoopMetadataProvider};
    use anyhow::Result;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedMetadataProvider(BookMetadata);

    #[async_trait]
    impl crate::enrichment::MetadataProvider for FixedMetadataProvider {
        async fn lookup(&self, _title: &str, _author: &str) -> Result<BookMetadata> {
            Ok(self.0.clone())
        }
    }

    struct FailingMetadataProvider;

    #[async_trait]
    impl crate::enrichment::MetadataProvider for FailingMetadataProvider {
        async fn lookup(&self, _title: &str, _author: &str) -> Result<BookMetadata> {
            anyhow::bail!("service unavailable")
        }
    }

    fn service_with(metadata: Arc<dyn MetadataProvider>) -> (BookService, TempDir) {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(SqliteBookStore::open_in_memory().unwrap());
        let local = Arc::new(LocalBookStore::open(dir.path()).unwrap());
        (BookService::new(remote, local, metadata), dir)
    }

    fn draft(title: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Some Author".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fresh_identity_gets_exactly_one_persisted_default_catalog() {
        let (service, _dir) = service_with(Arc::new(NoopMetadataProvider));

        let first = service.get_catalogs(Some("u1")).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, DEFAULT_CATALOG_NAME);

        // A second fetch returns the same catalog, not another new one.
        let second = service.get_catalogs(Some("u1")).unwrap();
        assert_eq!(second, first);

        // Guest mode gets its own default through the local backend.
        let guest = service.get_catalogs(None).unwrap();
        assert_eq!(guest.len(), 1);
        assert_eq!(guest[0].name, DEFAULT_CATALOG_NAME);
    }

    #[tokio::test]
    async fn backend_selection_follows_identity_presence() {
        let (service, _dir) = service_with(Arc::new(NoopMetadataProvider));
        let user_catalogs = service.get_catalogs(Some("u1")).unwrap();
        let guest_catalogs = service.get_catalogs(None).unwrap();
        let user_catalog = &user_catalogs[0];
        let guest_catalog = &guest_catalogs[0];

        let user_book = service
            .add_book(Some("u1"), &user_catalog.id, &draft("Remote"), false)
            .await
            .unwrap();
        let guest_book = service
            .add_book(None, &guest_catalog.id, &draft("Local"), false)
            .await
            .unwrap();

        // Each book is only visible through its own backend.
        assert!(service.get_book_by_id(Some("u1"), &guest_book.id).unwrap().is_none());
        assert!(service.get_book_by_id(None, &user_book.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn caller_supplied_fields_win_over_enrichment() {
        let metadata = BookMetadata {
            title: "ignored".to_string(),
            author: "ignored".to_string(),
            genre: Some("Fiction".to_string()),
            publication_year: Some(1999),
            description: Some("looked up".to_string()),
            ..Default::default()
        };
        let (service, _dir) = service_with(Arc::new(FixedMetadataProvider(metadata)));
        let catalogs = service.get_catalogs(None).unwrap();
        let catalog = &catalogs[0];

        let book = service
            .add_book(
                None,
                &catalog.id,
                &BookDraft {
                    title: "Dune".to_string(),
                    author: "Frank Herbert".to_string(),
                    genre: Some("Custom".to_string()),
                    ..Default::default()
                },
                true,
            )
            .await
            .unwrap();

        assert_eq!(book.genre.as_deref(), Some("Custom"));
        assert_eq!(book.publication_year, Some(1999));
        assert_eq!(book.description.as_deref(), Some("looked up"));
    }

    #[tokio::test]
    async fn enrichment_is_skipped_when_a_cover_is_supplied() {
        let metadata = BookMetadata {
            genre: Some("Fiction".to_string()),
            ..Default::default()
        };
        let (service, _dir) = service_with(Arc::new(FixedMetadataProvider(metadata)));
        let catalogs = service.get_catalogs(None).unwrap();
        let catalog = &catalogs[0];

        let book = service
            .add_book(
                None,
                &catalog.id,
                &BookDraft {
                    title: "Dune".to_string(),
                    author: "Frank Herbert".to_string(),
                    cover_image_url: Some("https://example.com/c.jpg".to_string()),
                    ..Default::default()
                },
                true,
            )
            .await
            .unwrap();

        assert_eq!(book.genre, None);
    }

    #[tokio::test]
    async fn enrichment_failure_degrades_to_plain_insert() {
        let (service, _dir) = service_with(Arc::new(FailingMetadataProvider));
        let catalogs = service.get_catalogs(None).unwrap();
        let catalog = &catalogs[0];

        let book = service
            .add_book(None, &catalog.id, &draft("Dune"), true)
            .await
            .unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.genre, None);
    }

    #[tokio::test]
    async fn commit_import_continues_past_failures() {
        let (service, _dir) = service_with(Arc::new(NoopMetadataProvider));
        let catalogs = service.get_catalogs(Some("u1")).unwrap();
        let catalog = &catalogs[0];

        // The second draft targets a catalog that does not exist, which the
        // SQLite foreign key rejects; the remaining drafts still go in.
        let good = [draft("One"), draft("Two"), draft("Three")];
        let outcome = service.commit_import(Some("u1"), &catalog.id, &good).await;
        assert_eq!(outcome, CommitOutcome { imported: 3, failed: 0 });

        let bad_catalog = service
            .commit_import(Some("u1"), "no-such-catalog", &[draft("Lost")])
            .await;
        assert_eq!(bad_catalog, CommitOutcome { imported: 0, failed: 1 });

        assert_eq!(service.get_books(Some("u1"), &catalog.id).unwrap().len(), 3);
    }
}
