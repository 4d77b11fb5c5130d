//! CSV codec for book records.
//!
//! The format is the application's own 9-column export shape. Decoding maps
//! columns by header name rather than position, so re-ordered or partially
//! present exports still import as long as Title and Author exist.

use super::{parse_publication_year, ImportResult};
use crate::book_store::{Book, BookDraft};

pub const CSV_HEADERS: [&str; 9] = [
    "Title",
    "Author",
    "Genre",
    "Holiday",
    "ISBN",
    "Year",
    "Description",
    "Tags",
    "Cover URL",
];

/// Tags are joined into a single cell with this separator on encode and
/// split on `;` on decode.
const TAG_JOIN: &str = "; ";

// =============================================================================
// Encode
// =============================================================================

/// Quote a field, doubling any literal quotes. Applied to every data cell,
/// so commas and newlines inside fields survive.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Encode books to CSV text. This path cannot fail and never skips a row.
pub fn encode(books: &[Book]) -> String {
    let mut lines = Vec::with_capacity(books.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for book in books {
        let year = book
            .publication_year
            .map(|y| y.to_string())
            .unwrap_or_default();
        let cells = [
            book.title.as_str(),
            book.author.as_str(),
            book.genre.as_deref().unwrap_or(""),
            book.holiday_category.as_deref().unwrap_or(""),
            book.isbn.as_deref().unwrap_or(""),
            year.as_str(),
            book.description.as_deref().unwrap_or(""),
            &book.tags.join(TAG_JOIN),
            book.cover_image_url.as_deref().unwrap_or(""),
        ];
        lines.push(
            cells
                .iter()
                .map(|cell| quote(cell))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

// =============================================================================
// Decode
// =============================================================================

/// Tokenize one line, respecting quotes: a `"` toggles the in-quotes state,
/// a doubled `""` inside quotes emits a literal quote, and commas inside
/// quotes do not split.
fn split_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                values.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    values.push(current);
    values
}

fn cell<'a>(values: &'a [String], index: Option<&usize>, fallback: usize) -> &'a str {
    values
        .get(*index.unwrap_or(&fallback))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Decode CSV text into importable drafts, collecting per-row warnings
/// instead of failing the whole file.
pub fn decode(content: &str) -> ImportResult {
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();

    if lines.len() < 2 {
        return ImportResult::failure("CSV file is empty or contains only headers");
    }

    let headers = split_line(lines[0]);
    let header_map: std::collections::HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| (header.trim().to_string(), index))
        .collect();

    if !header_map.contains_key("Title") || !header_map.contains_key("Author") {
        let mut result =
            ImportResult::failure("CSV must contain at least \"Title\" and \"Author\" columns");
        result.total_records = lines.len() - 1;
        return result;
    }

    let mut books = Vec::new();
    let mut warnings = Vec::new();

    for (i, line) in lines.iter().enumerate().skip(1) {
        let row = i + 1;
        let values = split_line(line);

        let title = cell(&values, header_map.get("Title"), 0);
        let author = cell(&values, header_map.get("Author"), 1);
        if title.is_empty() || author.is_empty() {
            warnings.push(format!("Row {}: Skipped - missing title or author", row));
            continue;
        }

        let mut book = BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            genre: non_empty(cell(&values, header_map.get("Genre"), 2)),
            holiday_category: non_empty(cell(&values, header_map.get("Holiday"), 3)),
            isbn: non_empty(cell(&values, header_map.get("ISBN"), 4)),
            description: non_empty(cell(&values, header_map.get("Description"), 6)),
            cover_image_url: non_empty(cell(&values, header_map.get("Cover URL"), 8)),
            ..Default::default()
        };

        let year_raw = cell(&values, header_map.get("Year"), 5);
        if !year_raw.is_empty() {
            match parse_publication_year(year_raw) {
                Some(year) => book.publication_year = Some(year),
                None => warnings.push(format!("Row {}: Invalid year \"{}\" - skipped", row, year_raw)),
            }
        }

        let tags_raw = cell(&values, header_map.get("Tags"), 7);
        if !tags_raw.is_empty() {
            book.tags = tags_raw
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }

        books.push(book);
    }

    ImportResult {
        success: !books.is_empty(),
        total_records: lines.len() - 1,
        valid_records: books.len(),
        books,
        errors: Vec::new(),
        warnings,
    }
}
