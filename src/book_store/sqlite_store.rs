//! SQLite-backed book store.
//!
//! This is the "remote" backend used for signed-in users. Every mutation is
//! keyed by record id AND owner, so a caller can never reach another
//! identity's records even with a guessed id.

use super::models::{now_iso, Book, BookDraft, BookPatch, Catalog, CatalogPatch};
use super::trait_def::{BookStore, StoreError, StoreResult};
use super::schema::BOOK_STORE_SCHEMA;
use anyhow::Result;
use rusqlite::{params, types::Type, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

const CATALOG_COLUMNS: &str = "id, owner, name, description, icon, color, created_at, updated_at";
const BOOK_COLUMNS: &str = "id, owner, catalog_id, title, author, genre, holiday_category, \
     cover_image_url, isbn, publication_year, description, tags, \
     is_manually_edited, is_favorite, is_read, created_at, updated_at";

pub struct SqliteBookStore {
    conn: Mutex<Connection>,
}

impl SqliteBookStore {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        BOOK_STORE_SCHEMA.ensure(&conn)?;
        info!("Opened book store database at {:?}", db_path);
        Ok(SqliteBookStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        BOOK_STORE_SCHEMA.ensure(&conn)?;
        Ok(SqliteBookStore {
            conn: Mutex::new(conn),
        })
    }

    fn catalog_from_row(row: &Row) -> rusqlite::Result<Catalog> {
        Ok(Catalog {
            id: row.get(0)?,
            owner: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            icon: row.get(4)?,
            color: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn book_from_row(row: &Row) -> rusqlite::Result<Book> {
        let tags_json: String = row.get(11)?;
        let tags: Vec<String> = serde_json::from_str(&tags_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;
        Ok(Book {
            id: row.get(0)?,
            owner: row.get(1)?,
            catalog_id: row.get(2)?,
            title: row.get(3)?,
            author: row.get(4)?,
            genre: row.get(5)?,
            holiday_category: row.get(6)?,
            cover_image_url: row.get(7)?,
            isbn: row.get(8)?,
            publication_year: row.get(9)?,
            description: row.get(10)?,
            tags,
            is_manually_edited: row.get(12)?,
            is_favorite: row.get(13)?,
            is_read: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }

    fn write_book_fields(conn: &Connection, book: &Book) -> StoreResult<()> {
        conn.execute(
            "UPDATE books SET title = ?1, author = ?2, genre = ?3, holiday_category = ?4, \
             cover_image_url = ?5, isbn = ?6, publication_year = ?7, description = ?8, \
             tags = ?9, is_manually_edited = ?10, is_favorite = ?11, is_read = ?12, \
             updated_at = ?13 WHERE id = ?14",
            params![
                book.title,
                book.author,
                book.genre,
                book.holiday_category,
                book.cover_image_url,
                book.isbn,
                book.publication_year,
                book.description,
                serde_json::to_string(&book.tags)?,
                book.is_manually_edited,
                book.is_favorite,
                book.is_read,
                book.updated_at,
                book.id,
            ],
        )?;
        Ok(())
    }

    fn get_book_scoped(
        conn: &Connection,
        owner: Option<&str>,
        book_id: &str,
    ) -> StoreResult<Option<Book>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM books WHERE id = ?1 AND owner IS ?2",
            BOOK_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![book_id, owner], Self::book_from_row)?;
        match rows.next() {
            Some(book) => Ok(Some(book?)),
            None => Ok(None),
        }
    }
}

impl BookStore for SqliteBookStore {
    fn get_catalogs(&self, owner: Option<&str>) -> StoreResult<Vec<Catalog>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM catalogs WHERE owner IS ?1 ORDER BY created_at ASC",
            CATALOG_COLUMNS
        ))?;
        let catalogs = stmt
            .query_map(params![owner], Self::catalog_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(catalogs)
    }

    fn create_catalog(
        &self,
        owner: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Catalog> {
        let catalog = Catalog::new(owner, name, description);
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO catalogs (id, owner, name, description, icon, color, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                catalog.id,
                catalog.owner,
                catalog.name,
                catalog.description,
                catalog.icon,
                catalog.color,
                catalog.created_at,
                catalog.updated_at,
            ],
        )?;
        Ok(catalog)
    }

    fn update_catalog(
        &self,
        owner: Option<&str>,
        catalog_id: &str,
        patch: &CatalogPatch,
    ) -> StoreResult<Catalog> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM catalogs WHERE id = ?1 AND owner IS ?2",
            CATALOG_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![catalog_id, owner], Self::catalog_from_row)?;
        let mut catalog = match rows.next() {
            Some(catalog) => catalog?,
            None => return Err(StoreError::NotFound),
        };
        drop(rows);
        drop(stmt);

        catalog.apply_patch(patch);
        conn.execute(
            "UPDATE catalogs SET name = ?1, description = ?2, icon = ?3, color = ?4, \
             updated_at = ?5 WHERE id = ?6",
            params![
                catalog.name,
                catalog.description,
                catalog.icon,
                catalog.color,
                catalog.updated_at,
                catalog.id,
            ],
        )?;
        Ok(catalog)
    }

    fn delete_catalog(&self, owner: Option<&str>, catalog_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            "DELETE FROM catalogs WHERE id = ?1 AND owner IS ?2",
            params![catalog_id, owner],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn get_books(&self, owner: Option<&str>, catalog_id: &str) -> StoreResult<Vec<Book>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM books WHERE owner IS ?1 AND catalog_id = ?2 \
             ORDER BY created_at DESC",
            BOOK_COLUMNS
        ))?;
        let books = stmt
            .query_map(params![owner, catalog_id], Self::book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn insert_book(
        &self,
        owner: Option<&str>,
        catalog_id: &str,
        draft: &BookDraft,
    ) -> StoreResult<Book> {
        let book = Book::from_draft(owner, catalog_id, draft);
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO books (id, owner, catalog_id, title, author, genre, holiday_category, \
             cover_image_url, isbn, publication_year, description, tags, \
             is_manually_edited, is_favorite, is_read, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                book.id,
                book.owner,
                book.catalog_id,
                book.title,
                book.author,
                book.genre,
                book.holiday_category,
                book.cover_image_url,
                book.isbn,
                book.publication_year,
                book.description,
                serde_json::to_string(&book.tags)?,
                book.is_manually_edited,
                book.is_favorite,
                book.is_read,
                book.created_at,
                book.updated_at,
            ],
        )?;
        Ok(book)
    }

    fn get_book_by_id(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Option<Book>> {
        let conn = self.conn.lock().unwrap();
        Self::get_book_scoped(&conn, owner, book_id)
    }

    fn update_book(
        &self,
        owner: Option<&str>,
        book_id: &str,
        patch: &BookPatch,
    ) -> StoreResult<Book> {
        let conn = self.conn.lock().unwrap();
        let mut book =
            Self::get_book_scoped(&conn, owner, book_id)?.ok_or(StoreError::NotFound)?;
        book.apply_patch(patch);
        Self::write_book_fields(&conn, &book)?;
        Ok(book)
    }

    fn delete_book(&self, owner: Option<&str>, book_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            "DELETE FROM books WHERE id = ?1 AND owner IS ?2",
            params![book_id, owner],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn toggle_favorite(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Book> {
        let conn = self.conn.lock().unwrap();
        let mut book =
            Self::get_book_scoped(&conn, owner, book_id)?.ok_or(StoreError::NotFound)?;
        book.is_favorite = !book.is_favorite;
        book.updated_at = now_iso();
        Self::write_book_fields(&conn, &book)?;
        Ok(book)
    }

    fn toggle_read(&self, owner: Option<&str>, book_id: &str) -> StoreResult<Book> {
        let conn = self.conn.lock().unwrap();
        let mut book =
            Self::get_book_scoped(&conn, owner, book_id)?.ok_or(StoreError::NotFound)?;
        book.is_read = !book.is_read;
        book.updated_at = now_iso();
        Self::write_book_fields(&conn, &book)?;
        Ok(book)
    }
}
