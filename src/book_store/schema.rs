//! SQLite schema for the owner-scoped book store.

use crate::sqlite_persistence::{Column, Schema, SqlType, Table};

const CATALOGS_TABLE: Table = Table {
    name: "catalogs",
    columns: &[
        Column::new("id", SqlType::Text).primary_key(),
        Column::new("owner", SqlType::Text),
        Column::new("name", SqlType::Text).non_null(),
        Column::new("description", SqlType::Text),
        Column::new("icon", SqlType::Text),
        Column::new("color", SqlType::Text),
        Column::new("created_at", SqlType::Text).non_null(),
        Column::new("updated_at", SqlType::Text).non_null(),
    ],
    indices: &[("idx_catalogs_owner", "owner")],
};

const BOOKS_TABLE: Table = Table {
    name: "books",
    columns: &[
        Column::new("id", SqlType::Text).primary_key(),
        Column::new("owner", SqlType::Text),
        Column::new("catalog_id", SqlType::Text)
            .non_null()
            .references("catalogs", "id"),
        Column::new("title", SqlType::Text).non_null(),
        Column::new("author", SqlType::Text).non_null(),
        Column::new("genre", SqlType::Text),
        Column::new("holiday_category", SqlType::Text),
        Column::new("cover_image_url", SqlType::Text),
        Column::new("isbn", SqlType::Text),
        Column::new("publication_year", SqlType::Integer),
        Column::new("description", SqlType::Text),
        // JSON array of strings
        Column::new("tags", SqlType::Text).non_null().default_value("'[]'"),
        Column::new("is_manually_edited", SqlType::Integer).non_null().default_value("0"),
        Column::new("is_favorite", SqlType::Integer).non_null().default_value("0"),
        Column::new("is_read", SqlType::Integer).non_null().default_value("0"),
        Column::new("created_at", SqlType::Text).non_null(),
        Column::new("updated_at", SqlType::Text).non_null(),
    ],
    indices: &[
        ("idx_books_owner", "owner"),
        ("idx_books_catalog_id", "catalog_id"),
    ],
};

pub const BOOK_STORE_SCHEMA: Schema = Schema {
    version: 1,
    tables: &[CATALOGS_TABLE, BOOKS_TABLE],
};
