//! Export entry points: format dispatch and download naming.

use super::{csv_codec, html_codec};
use crate::book_store::Book;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    static ref FILENAME_SANITIZER: Regex = Regex::new(r"[^A-Za-z0-9_-]").unwrap();
}

const FALLBACK_FILENAME: &str = "book-catalog";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    /// Excel opens HTML tables directly; this ships the HTML document with
    /// an .html extension for it.
    Excel,
    /// Same HTML document, served inline for the browser's print pipeline.
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel | ExportFormat::Pdf => "html",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Excel | ExportFormat::Pdf => "text/html; charset=utf-8",
        }
    }
}

/// A ready-to-serve export: generated text plus download metadata.
pub struct ExportDocument {
    pub filename: String,
    pub content: String,
    pub content_type: &'static str,
    /// Inline documents open in the browser (print view) instead of
    /// downloading.
    pub inline: bool,
}

/// `<sanitized-name>-<ISO-date>.<ext>`; anything outside `[A-Za-z0-9_-]`
/// becomes an underscore.
pub fn export_filename(name: &str, extension: &str) -> String {
    let sanitized = if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        FILENAME_SANITIZER.replace_all(name, "_").into_owned()
    };
    let date = Utc::now().format("%Y-%m-%d");
    format!("{}-{}.{}", sanitized, date, extension)
}

pub fn export_books(books: &[Book], format: ExportFormat, name: &str) -> ExportDocument {
    let content = match format {
        ExportFormat::Csv => csv_codec::encode(books),
        ExportFormat::Excel | ExportFormat::Pdf => html_codec::encode(books),
    };
    ExportDocument {
        filename: export_filename(name, format.extension()),
        content,
        content_type: format.content_type(),
        inline: format == ExportFormat::Pdf,
    }
}
