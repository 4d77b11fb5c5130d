//! Best-effort bibliographic metadata enrichment.
//!
//! Providers are external collaborators with no availability guarantee; a
//! failed or empty lookup always degrades to "no enrichment" at the call
//! site, it never aborts the add-book flow.

mod classify;
mod google_books;

pub use classify::{classify_genre, detect_holiday_category};
pub use google_books::{GoogleBooksClient, GOOGLE_BOOKS_API_BASE};

use anyhow::Result;
use async_trait::async_trait;

/// Bibliographic fields a lookup may contribute to a new book record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub holiday_category: Option<String>,
    pub cover_image_url: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up metadata for a title/author pair.
    ///
    /// Returns Ok with whatever could be found; an empty result simply
    /// echoes the query back with no optional fields set.
    async fn lookup(&self, title: &str, author: &str) -> Result<BookMetadata>;
}

/// Provider used when enrichment is disabled: contributes nothing.
pub struct NoopMetadataProvider;

#[async_trait]
impl MetadataProvider for NoopMetadataProvider {
    async fn lookup(&self, title: &str, author: &str) -> Result<BookMetadata> {
        Ok(BookMetadata {
            title: title.to_string(),
            author: author.to_string(),
            ..Default::default()
        })
    }
}
