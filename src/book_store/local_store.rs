//! Device-local book store for guest mode.
//!
//! Collections are persisted as whole serialized JSON blobs behind a small
//! key/value abstraction: every mutation reads the full collection, applies
//! its change and writes the collection back. Concurrent writers race with
//! last-writer-wins semantics; this backend is single-device and
//! single-guest by construction.

use super::models::{now_iso, Book, BookDraft, BookPatch, Catalog, CatalogPatch};
use super::trait_def::{BookStore, StoreError, StoreResult};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

const BOOKS_KEY: &str = "guest_books";
const CATALOGS_KEY: &str = "guest_catalogs";

/// Whole-value get/set by string key.
pub trait DeviceKv: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed device storage: one file per key under a directory.
pub struct FileDeviceKv {
    dir: PathBuf,
}

impl FileDeviceKv {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Could not create guest store directory {:?}", dir))?;
        Ok(FileDeviceKv { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl DeviceKv for FileDeviceKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Could not read {:?}", path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("Could not write {:?}", path))
    }
}

pub struct LocalBookStore {
    kv: Box<dyn DeviceKv>,
}

impl LocalBookStore {
    pub fn new(kv: Box<dyn DeviceKv>) -> Self {
        LocalBookStore { kv }
    }

    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(LocalBookStore::new(Box::new(FileDeviceKv::new(dir)?)))
    }

    /// An unreadable or corrupt blob degrades to an empty collection rather
    /// than wedging guest mode.
    fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("Error reading {} from device storage: {:#}", key, err);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!("Corrupt {} blob in device storage: {}", key, err);
                Vec::new()
            }
        }
    }

    fn save<T: serde::Serialize>(&self, key: &str, items: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string(items)?;
        self.kv.set(key, &raw).map_err(StoreError::Backend)
    }

    fn load_books(&self) -> Vec<Book> {
        self.load(BOOKS_KEY)
    }

    fn load_catalogs(&self) -> Vec<Catalog> {
        self.load(CATALOGS_KEY)
    }

    fn mutate_book<F>(&self, book_id: &str, mutate: F) -> StoreResult<Book>
    where
        F: FnOnce(&mut Book),
    {
        let mut books = self.load_books();
        let book = books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or(StoreError::NotFound)?;
        mutate(book);
        let updated = book.clone();
        self.save(BOOKS_KEY, &books)?;
        Ok(updated)
    }
}

impl BookStore for LocalBookStore {
    fn get_catalogs(&self, _owner: Option<&str>) -> StoreResult<Vec<Catalog>> {
        Ok(self.load_catalogs())
    }

    fn create_catalog(
        &self,
        _owner: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Catalog> {
        let mut catalogs = self.load_catalogs();
        let catalog = Catalog::new(None, name, description);
        catalogs.push(catalog.clone());
        self.save(CATALOGS_KEY, &catalogs)?;
        Ok(catalog)
    }

    fn update_catalog(
        &self,
        _owner: Option<&str>,
        catalog_id: &str,
        patch: &CatalogPatch,
    ) -> StoreResult<Catalog> {
        let mut catalogs = self.load_catalogs();
        let catalog = catalogs
            .iter_mut()
            .find(|c| c.id == catalog_id)
            .ok_or(StoreError::NotFound)?;
        catalog.apply_patch(patch);
        let updated = catalog.clone();
        self.save(CATALOGS_KEY, &catalogs)?;
        Ok(updated)
    }

    fn delete_catalog(&self, _owner: Option<&str>, catalog_id: &str) -> StoreResult<()> {
        let mut catalogs = self.load_catalogs();
        let before = catalogs.len();
        catalogs.retain(|c| c.id != catalog_id);
        if catalogs.len() == before {
            return Err(StoreError::NotFound);
        }
        self.save(CATALOGS_KEY, &catalogs)?;

        // Books of the deleted catalog go with it, like the SQLite cascade.
        let mut books = self.load_books();
        let had_books = books.len();
        books.retain(|b| b.catalog_id != catalog_id);
        if books.len() != had_books {
            self.save(BOOKS_KEY, &books)?;
        }
        Ok(())
    }

    fn get_books(&self, _owner: Option<&str>, catalog_id: &str) -> StoreResult<Vec<Book>> {
        let mut books: Vec<Book> = self
            .load_books()
            .into_iter()
            .filter(|b| b.catalog_id == catalog_id)
            .collect();
        // Newest first, matching the SQLite backend's ordering.
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(books)
    }

    fn insert_book(
        &self,
        _owner: Option<&str>,
        catalog_id: &str,
        draft: &BookDraft,
    ) -> StoreResult<Book> {
        let mut books = self.load_books();
        let book = Book::from_draft(None, catalog_id, draft);
        books.push(book.clone());
        self.save(BOOKS_KEY, &books)?;
        Ok(book)
    }

    fn get_book_by_id(&self, _owner: Option<&str>, book_id: &str) -> StoreResult<Option<Book>> {
        Ok(self.load_books().into_iter().find(|b| b.id == book_id))
    }

    fn update_book(
        &self,
        _owner: Option<&str>,
        book_id: &str,
        patch: &BookPatch,
    ) -> StoreResult<Book> {
        self.mutate_book(book_id, |book| book.apply_patch(patch))
    }

    fn delete_book(&self, _owner: Option<&str>, book_id: &str) -> StoreResult<()> {
        let mut books = self.load_books();
        let before = books.len();
        books.retain(|b| b.id != book_id);
        if books.len() == before {
            return Err(StoreError::NotFound);
        }
        self.save(BOOKS_KEY, &books)?;
        Ok(())
    }

    fn toggle_favorite(&self, _owner: Option<&str>, book_id: &str) -> StoreResult<Book> {
        self.mutate_book(book_id, |book| {
            book.is_favorite = !book.is_favorite;
            book.updated_at = now_iso();
        })
    }

    fn toggle_read(&self, _owner: Option<&str>, book_id: &str) -> StoreResult<Book> {
        self.mutate_book(book_id, |book| {
            book.is_read = !book.is_read;
            book.updated_at = now_iso();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft(title: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Some Author".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn books_persist_across_store_instances_on_the_same_device() {
        let dir = TempDir::new().unwrap();
        let book_id = {
            let store = LocalBookStore::open(dir.path()).unwrap();
            let catalog = store.create_catalog(None, "Guest", None).unwrap();
            store.insert_book(None, &catalog.id, &draft("Dune")).unwrap().id
        };

        let reopened = LocalBookStore::open(dir.path()).unwrap();
        let fetched = reopened.get_book_by_id(None, &book_id).unwrap();
        assert_eq!(fetched.map(|b| b.title), Some("Dune".to_string()));
    }

    #[test]
    fn missing_blobs_read_as_empty_collections() {
        let dir = TempDir::new().unwrap();
        let store = LocalBookStore::open(dir.path()).unwrap();
        assert!(store.get_catalogs(None).unwrap().is_empty());
        assert!(store.get_books(None, "whatever").unwrap().is_empty());
    }

    #[test]
    fn corrupt_blob_degrades_to_empty_instead_of_failing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("guest_books.json"), "{not json").unwrap();
        let store = LocalBookStore::open(dir.path()).unwrap();
        assert!(store.get_books(None, "c1").unwrap().is_empty());
    }

    #[test]
    fn toggles_and_deletes_report_not_found_for_unknown_ids() {
        let dir = TempDir::new().unwrap();
        let store = LocalBookStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.toggle_favorite(None, "nope"),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete_book(None, "nope"), Err(StoreError::NotFound)));
    }

    #[test]
    fn deleting_a_catalog_removes_its_books() {
        let dir = TempDir::new().unwrap();
        let store = LocalBookStore::open(dir.path()).unwrap();
        let keep = store.create_catalog(None, "Keep", None).unwrap();
        let doomed = store.create_catalog(None, "Doomed", None).unwrap();
        store.insert_book(None, &keep.id, &draft("Stays")).unwrap();
        store.insert_book(None, &doomed.id, &draft("Goes")).unwrap();

        store.delete_catalog(None, &doomed.id).unwrap();
        assert_eq!(store.get_books(None, &doomed.id).unwrap().len(), 0);
        assert_eq!(store.get_books(None, &keep.id).unwrap().len(), 1);
    }
}
