//! HTML codec for book records.
//!
//! Encode produces a standalone styled document with a single 7-column
//! table (Cover, Title, Author, Genre, Holiday, Year, Tags). The same
//! markup backs both the "Excel" export (Excel opens HTML tables directly)
//! and the "PDF" export (rendered by the browser's print pipeline). Decode
//! walks the table body of a previously exported document and recovers
//! importable drafts with the same row-isolation policy as the CSV path.

use super::{parse_publication_year, ImportResult};
use crate::book_store::{Book, BookDraft};
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Tags are joined with `, ` in the table cell and split on `,` on decode.
/// Note the CSV codec uses `;`.
const TAG_JOIN: &str = ", ";

/// Number of cells a row needs to be importable.
const MIN_ROW_CELLS: usize = 7;

// =============================================================================
// Encode
// =============================================================================

const CELL_STYLE: &str = "border: 1px solid #ddd; padding: 8px;";

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn encode_row(book: &Book) -> String {
    let cover = match &book.cover_image_url {
        Some(url) => format!(
            "<img src=\"{}\" style=\"width: 50px; height: auto;\" />",
            html_escape(url)
        ),
        None => String::new(),
    };
    let year = book
        .publication_year
        .map(|y| y.to_string())
        .unwrap_or_default();

    let mut row = String::from("      <tr>\n");
    row.push_str(&format!("        <td style=\"{}\">{}</td>\n", CELL_STYLE, cover));
    for cell in [
        html_escape(&book.title),
        html_escape(&book.author),
        html_escape(book.genre.as_deref().unwrap_or("")),
        html_escape(book.holiday_category.as_deref().unwrap_or("")),
        year,
        html_escape(&book.tags.join(TAG_JOIN)),
    ] {
        row.push_str(&format!("        <td style=\"{}\">{}</td>\n", CELL_STYLE, cell));
    }
    row.push_str("      </tr>\n");
    row
}

/// Encode books into a standalone printable HTML document.
pub fn encode(books: &[Book]) -> String {
    let rows: String = books.iter().map(encode_row).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>My Book Catalog</title>
  <style>
    body {{ font-family: Arial, sans-serif; padding: 20px; }}
    h1 {{ color: #333; }}
    table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
    th {{ background-color: #4CAF50; color: white; border: 1px solid #ddd; padding: 12px; text-align: left; }}
    td {{ border: 1px solid #ddd; padding: 8px; }}
    tr:nth-child(even) {{ background-color: #f2f2f2; }}
  </style>
</head>
<body>
  <h1>My Book Catalog</h1>
  <p>Total Books: {count}</p>
  <table>
    <thead>
      <tr>
        <th>Cover</th>
        <th>Title</th>
        <th>Author</th>
        <th>Genre</th>
        <th>Holiday</th>
        <th>Year</th>
        <th>Tags</th>
      </tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
</body>
</html>
"#,
        count = books.len(),
        rows = rows,
    )
}

// =============================================================================
// Decode
// =============================================================================

#[derive(Default)]
struct RowAccumulator {
    cells: Vec<String>,
    current_cell: Option<String>,
    cover_src: Option<String>,
}

impl RowAccumulator {
    fn start_cell(&mut self) {
        self.current_cell = Some(String::new());
    }

    fn end_cell(&mut self) {
        if let Some(cell) = self.current_cell.take() {
            self.cells.push(cell.trim().to_string());
        }
    }
}

fn tag_name(raw: &[u8]) -> Vec<u8> {
    raw.to_ascii_lowercase()
}

/// Resolve an entity reference body (without `&`/`;`) to its character:
/// the predefined XML entities plus numeric character references.
fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = entity.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn draft_from_row(row: &RowAccumulator, index: usize, warnings: &mut Vec<String>) -> Option<BookDraft> {
    let row_number = index + 1;
    if row.cells.len() < MIN_ROW_CELLS {
        warnings.push(format!("Row {}: Not enough columns - skipped", row_number));
        return None;
    }

    let title = row.cells[1].as_str();
    let author = row.cells[2].as_str();
    if title.is_empty() || author.is_empty() {
        warnings.push(format!("Row {}: Missing title or author - skipped", row_number));
        return None;
    }

    let non_empty = |s: &str| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    };

    let mut draft = BookDraft {
        title: title.to_string(),
        author: author.to_string(),
        genre: non_empty(&row.cells[3]),
        holiday_category: non_empty(&row.cells[4]),
        cover_image_url: row.cover_src.clone(),
        ..Default::default()
    };

    let year_raw = row.cells[5].as_str();
    if !year_raw.is_empty() {
        draft.publication_year = parse_publication_year(year_raw);
    }

    let tags_raw = row.cells[6].as_str();
    if !tags_raw.is_empty() {
        draft.tags = tags_raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
    }

    Some(draft)
}

/// Decode a previously exported HTML document's table back into drafts.
pub fn decode(content: &str) -> ImportResult {
    let mut reader = Reader::from_str(content);
    // Exports are well-formed but hand-edited files may not be; unmatched
    // end tags should not kill the whole parse.
    reader.config_mut().check_end_names = false;

    let mut books = Vec::new();
    let mut warnings = Vec::new();
    let mut total_rows = 0usize;

    let mut in_tbody = false;
    let mut row: Option<RowAccumulator> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if tag_name(e.name().as_ref()) == b"img" => {
                if let Some(row) = row.as_mut() {
                    // Only the cover cell is expected to carry an image.
                    if row.cells.is_empty() && row.cover_src.is_none() {
                        let src = e.attributes().flatten().find_map(|attr| {
                            if attr.key.as_ref().eq_ignore_ascii_case(b"src") {
                                let raw = String::from_utf8_lossy(&attr.value).into_owned();
                                let value = unescape(&raw)
                                    .map(|v| v.into_owned())
                                    .unwrap_or_else(|_| raw.clone());
                                Some(value)
                            } else {
                                None
                            }
                        });
                        row.cover_src = src.filter(|s| !s.is_empty());
                    }
                }
            }
            Ok(Event::Start(e)) => match tag_name(e.name().as_ref()).as_slice() {
                b"tbody" => in_tbody = true,
                b"tr" if in_tbody => row = Some(RowAccumulator::default()),
                b"td" => {
                    if let Some(row) = row.as_mut() {
                        row.start_cell();
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match tag_name(e.name().as_ref()).as_slice() {
                b"tbody" => in_tbody = false,
                b"tr" => {
                    if let Some(finished) = row.take() {
                        if let Some(draft) = draft_from_row(&finished, total_rows, &mut warnings) {
                            books.push(draft);
                        }
                        total_rows += 1;
                    }
                }
                b"td" => {
                    if let Some(row) = row.as_mut() {
                        row.end_cell();
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let Some(cell) = row.as_mut().and_then(|r| r.current_cell.as_mut()) {
                    cell.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(cell) = row.as_mut().and_then(|r| r.current_cell.as_mut()) {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        cell.push(resolved);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return ImportResult::failure(format!("Failed to parse HTML: {}", err));
            }
        }
    }

    if total_rows == 0 {
        return ImportResult::failure("No book data found in HTML file");
    }

    ImportResult {
        success: !books.is_empty(),
        total_records: total_rows,
        valid_records: books.len(),
        books,
        errors: Vec::new(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_store::BookDraft;

    fn book(title: &str, author: &str) -> Book {
        Book::from_draft(
            None,
            "c1",
            &BookDraft {
                title: title.to_string(),
                author: author.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn round_trip_preserves_table_fields() {
        let mut a = book("Dune & Sons", "Frank \"Frank\" Herbert");
        a.genre = Some("Fiction".to_string());
        a.holiday_category = Some("Summer".to_string());
        a.publication_year = Some(1965);
        a.tags = vec!["sci-fi".to_string(), "classic".to_string()];
        a.cover_image_url = Some("https://example.com/dune.jpg?a=1&b=2".to_string());
        let b = book("Emma", "Jane Austen");

        let result = decode(&encode(&[a.clone(), b]));
        assert!(result.success, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
        assert_eq!(result.valid_records, 2);

        let decoded = &result.books[0];
        assert_eq!(decoded.title, a.title);
        assert_eq!(decoded.author, a.author);
        assert_eq!(decoded.genre, a.genre);
        assert_eq!(decoded.holiday_category, a.holiday_category);
        assert_eq!(decoded.publication_year, a.publication_year);
        assert_eq!(decoded.tags, a.tags);
        assert_eq!(decoded.cover_image_url, a.cover_image_url);
    }

    #[test]
    fn book_without_cover_decodes_without_one() {
        let result = decode(&encode(&[book("Emma", "Jane Austen")]));
        assert!(result.success);
        assert_eq!(result.books[0].cover_image_url, None);
    }

    #[test]
    fn document_without_table_rows_is_a_hard_failure() {
        let result = decode("<!DOCTYPE html><html><body><p>nothing here</p></body></html>");
        assert!(!result.success);
        assert_eq!(result.errors, vec!["No book data found in HTML file".to_string()]);
        assert!(result.books.is_empty());
    }

    #[test]
    fn narrow_rows_are_skipped_with_a_warning() {
        let content = "<html><body><table><tbody>\
                       <tr><td></td><td>Dune</td><td>Frank Herbert</td></tr>\
                       </tbody></table></body></html>";
        let result = decode(content);
        assert!(!result.success);
        assert_eq!(result.total_records, 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Not enough columns"));
    }

    #[test]
    fn rows_missing_title_or_author_are_skipped() {
        let mut missing_author = book("Orphan", "");
        missing_author.publication_year = Some(2001);
        let fine = book("Dune", "Frank Herbert");

        let result = decode(&encode(&[missing_author, fine]));
        assert!(result.success);
        assert_eq!(result.total_records, 2);
        assert_eq!(result.valid_records, 1);
        assert!(result.warnings[0].contains("Missing title or author"));
        assert_eq!(result.books[0].title, "Dune");
    }

    #[test]
    fn out_of_range_year_is_dropped_but_row_kept() {
        let mut b = book("Dune", "Frank Herbert");
        b.publication_year = Some(99999);
        // Encode writes the year verbatim; decode must refuse it.
        let result = decode(&encode(&[b]));
        assert!(result.success);
        assert_eq!(result.books[0].publication_year, None);
    }

    #[test]
    fn tags_cell_splits_on_commas() {
        let mut b = book("Dune", "Frank Herbert");
        b.tags = vec!["sci-fi".to_string(), "classic".to_string()];
        let result = decode(&encode(&[b]));
        assert_eq!(
            result.books[0].tags,
            vec!["sci-fi".to_string(), "classic".to_string()]
        );
    }
}
