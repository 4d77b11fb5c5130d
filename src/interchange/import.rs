//! Import orchestration: format detection and codec dispatch.
//!
//! Nothing here ever propagates an error to the caller; every failure path
//! resolves to a well-formed `ImportResult` carrying the failure in its
//! `errors` list, so the preview UI always has something to show.

use super::{csv_codec, html_codec, ImportResult};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Html,
}

/// Detect the import format. The filename extension takes precedence over
/// content sniffing; sniffing looks for an HTML prologue first, then for a
/// recognizable CSV header signature.
pub fn detect_format(content: &str, filename: &str) -> Option<ImportFormat> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".csv") {
        return Some(ImportFormat::Csv);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(ImportFormat::Html);
    }

    let trimmed = content.trim_start();
    if trimmed.starts_with("<!DOCTYPE html") || trimmed.starts_with("<html") {
        return Some(ImportFormat::Html);
    }
    if content.contains("Title,Author") || content.contains("\"Title\",\"Author\"") {
        return Some(ImportFormat::Csv);
    }
    None
}

/// Decode already-read file content.
pub fn import_content(content: &str, filename: &str) -> ImportResult {
    if content.is_empty() {
        return ImportResult::failure("File is empty");
    }

    match detect_format(content, filename) {
        Some(ImportFormat::Csv) => {
            debug!("Importing {} as CSV", filename);
            csv_codec::decode(content)
        }
        Some(ImportFormat::Html) => {
            debug!("Importing {} as HTML", filename);
            html_codec::decode(content)
        }
        None => ImportResult::failure(
            "Unsupported file format. Please upload a CSV or HTML file exported from this application.",
        ),
    }
}

/// Read a file and decode it. Suspends only for the read; a read failure
/// resolves to a failure result rather than an error.
pub async fn import_from_file(path: &Path) -> ImportResult {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match tokio::fs::read_to_string(path).await {
        Ok(content) => import_content(&content, &filename),
        Err(err) => ImportResult::failure(format!("Failed to read file: {}", err)),
    }
}
