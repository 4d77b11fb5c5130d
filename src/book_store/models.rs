//! Catalog and book entities shared by both storage backends.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current timestamp in the RFC 3339 form records are stored with.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// A named, owned collection of books. `owner` is `None` for guest data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: String,
    pub owner: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Catalog {
    pub fn new(owner: Option<&str>, name: &str, description: Option<&str>) -> Self {
        let now = now_iso();
        Catalog {
            id: new_record_id(),
            owner: owner.map(str::to_string),
            name: name.to_string(),
            description: description.map(str::to_string),
            icon: None,
            color: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial catalog update. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl Catalog {
    pub fn apply_patch(&mut self, patch: &CatalogPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(icon) = &patch.icon {
            self.icon = Some(icon.clone());
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        self.updated_at = now_iso();
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub owner: Option<String>,
    pub catalog_id: String,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub holiday_category: Option<String>,
    pub cover_image_url: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_manually_edited: bool,
    pub is_favorite: bool,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Book {
    /// Materialize a draft into a fresh record. All flags start false on
    /// every backend.
    pub fn from_draft(owner: Option<&str>, catalog_id: &str, draft: &BookDraft) -> Self {
        let now = now_iso();
        Book {
            id: new_record_id(),
            owner: owner.map(str::to_string),
            catalog_id: catalog_id.to_string(),
            title: draft.title.clone(),
            author: draft.author.clone(),
            genre: draft.genre.clone(),
            holiday_category: draft.holiday_category.clone(),
            cover_image_url: draft.cover_image_url.clone(),
            isbn: draft.isbn.clone(),
            publication_year: draft.publication_year,
            description: draft.description.clone(),
            tags: draft.tags.clone(),
            is_manually_edited: false,
            is_favorite: false,
            is_read: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Apply a user edit. Any update marks the record as manually edited,
    /// regardless of which fields changed.
    pub fn apply_patch(&mut self, patch: &BookPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        if let Some(genre) = &patch.genre {
            self.genre = Some(genre.clone());
        }
        if let Some(holiday_category) = &patch.holiday_category {
            self.holiday_category = Some(holiday_category.clone());
        }
        if let Some(cover_image_url) = &patch.cover_image_url {
            self.cover_image_url = Some(cover_image_url.clone());
        }
        if let Some(isbn) = &patch.isbn {
            self.isbn = Some(isbn.clone());
        }
        if let Some(publication_year) = patch.publication_year {
            self.publication_year = Some(publication_year);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        self.is_manually_edited = true;
        self.updated_at = now_iso();
    }
}

/// The creatable/importable subset of a book record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Partial book update. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub holiday_category: Option<String>,
    pub cover_image_url: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}
