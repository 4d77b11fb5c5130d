//! Catalog interchange: CSV/HTML codecs, the import orchestrator and the
//! export entry points.
//!
//! Decoding follows a row-isolation policy: structural problems (empty
//! file, no usable header, no table rows) abort the whole import as hard
//! errors, while per-row defects drop only that row and accumulate as
//! warnings.

pub mod csv_codec;
pub mod export;
pub mod html_codec;
pub mod import;

pub use export::{export_books, export_filename, ExportDocument, ExportFormat};
pub use import::{detect_format, import_content, import_from_file, ImportFormat};

use crate::book_store::BookDraft;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Aggregated outcome of one import attempt. Created fresh per attempt and
/// consumed immediately by the preview-then-commit flow, never persisted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportResult {
    /// True iff at least one record parsed successfully.
    pub success: bool,
    pub books: Vec<BookDraft>,
    /// File-level failures that aborted parsing.
    pub errors: Vec<String>,
    /// Row-level issues; each one cost a row (or a field) but parsing went on.
    pub warnings: Vec<String>,
    pub total_records: usize,
    pub valid_records: usize,
}

impl ImportResult {
    pub fn failure(error: impl Into<String>) -> Self {
        ImportResult {
            errors: vec![error.into()],
            ..Default::default()
        }
    }
}

/// Publication years must be positive and at most ten years in the future.
pub(crate) fn is_valid_publication_year(year: i32) -> bool {
    year > 0 && year <= Utc::now().year() + 10
}

pub(crate) fn parse_publication_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.trim().parse().ok()?;
    is_valid_publication_year(year).then_some(year)
}
