//! Filter/search evaluation over an in-memory book list.

use crate::book_store::Book;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A conjunction of independent predicates; an absent field means "no
/// constraint from this dimension". `read` and `unread` are mutually
/// exclusive by convention, not enforced here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub favorites: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub unread: bool,
    pub genre: Option<String>,
    pub holiday_category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub search: Option<String>,
}

/// Pure narrowing of `books` by each active predicate in turn. The result
/// is always a subset of the input and an empty filter passes everything
/// through unchanged.
pub fn filter_books(books: &[Book], filters: &FilterOptions) -> Vec<Book> {
    let mut filtered: Vec<Book> = books.to_vec();

    if filters.favorites {
        filtered.retain(|book| book.is_favorite);
    }
    if filters.read {
        filtered.retain(|book| book.is_read);
    }
    if filters.unread {
        filtered.retain(|book| !book.is_read);
    }
    if let Some(genre) = &filters.genre {
        filtered.retain(|book| book.genre.as_deref() == Some(genre.as_str()));
    }
    if let Some(holiday) = &filters.holiday_category {
        filtered.retain(|book| book.holiday_category.as_deref() == Some(holiday.as_str()));
    }
    if let Some(tags) = &filters.tags {
        if !tags.is_empty() {
            filtered.retain(|book| tags.iter().any(|tag| book.tags.contains(tag)));
        }
    }
    if let Some(search) = &filters.search {
        let query = search.to_lowercase();
        filtered.retain(|book| {
            book.title.to_lowercase().contains(&query)
                || book.author.to_lowercase().contains(&query)
                || book
                    .description
                    .as_ref()
                    .map(|d| d.to_lowercase().contains(&query))
                    .unwrap_or(false)
        });
    }

    filtered
}

/// Uniform random pick over the current (already filtered) list.
pub fn pick_random(books: &[Book]) -> Option<&Book> {
    if books.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..books.len());
    Some(&books[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_store::BookDraft;

    fn book(title: &str) -> Book {
        Book::from_draft(
            None,
            "c1",
            &BookDraft {
                title: title.to_string(),
                author: "Author".to_string(),
                ..Default::default()
            },
        )
    }

    fn library() -> Vec<Book> {
        let mut dune = book("Dune");
        dune.genre = Some("Fiction".to_string());
        dune.tags = vec!["a".to_string(), "b".to_string()];
        dune.is_favorite = true;
        dune.is_read = true;
        dune.description = Some("Spice and sandworms".to_string());

        let mut emma = book("Emma");
        emma.genre = Some("Fiction".to_string());
        emma.holiday_category = Some("Valentine".to_string());

        let mut cookbook = book("Bread at Home");
        cookbook.genre = Some("Non-fiction".to_string());
        cookbook.tags = vec!["cooking".to_string()];

        vec![dune, emma, cookbook]
    }

    #[test]
    fn empty_filter_passes_everything_through() {
        let books = library();
        let result = filter_books(&books, &FilterOptions::default());
        assert_eq!(result, books);
    }

    #[test]
    fn every_result_is_a_subset_of_the_input() {
        let books = library();
        let filters = FilterOptions {
            favorites: true,
            genre: Some("Fiction".to_string()),
            search: Some("dune".to_string()),
            ..Default::default()
        };
        let result = filter_books(&books, &filters);
        assert!(result.iter().all(|b| books.contains(b)));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn flag_predicates_narrow_by_status() {
        let books = library();
        assert_eq!(
            filter_books(&books, &FilterOptions { favorites: true, ..Default::default() }).len(),
            1
        );
        assert_eq!(
            filter_books(&books, &FilterOptions { read: true, ..Default::default() }).len(),
            1
        );
        assert_eq!(
            filter_books(&books, &FilterOptions { unread: true, ..Default::default() }).len(),
            2
        );
    }

    #[test]
    fn genre_and_holiday_match_exactly() {
        let books = library();
        let fiction = filter_books(
            &books,
            &FilterOptions { genre: Some("Fiction".to_string()), ..Default::default() },
        );
        assert_eq!(fiction.len(), 2);

        let valentine = filter_books(
            &books,
            &FilterOptions {
                holiday_category: Some("Valentine".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(valentine.len(), 1);
        assert_eq!(valentine[0].title, "Emma");
    }

    #[test]
    fn tag_filter_matches_on_non_empty_intersection() {
        let books = library();
        let hit = filter_books(
            &books,
            &FilterOptions {
                tags: Some(vec!["b".to_string(), "c".to_string()]),
                ..Default::default()
            },
        );
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].title, "Dune");

        let miss = filter_books(
            &books,
            &FilterOptions {
                tags: Some(vec!["c".to_string(), "d".to_string()]),
                ..Default::default()
            },
        );
        assert!(miss.is_empty());

        // An empty tag set imposes no constraint.
        let all = filter_books(
            &books,
            &FilterOptions { tags: Some(vec![]), ..Default::default() },
        );
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_across_title_author_description() {
        let books = library();
        let by_title = filter_books(
            &books,
            &FilterOptions { search: Some("DUNE".to_string()), ..Default::default() },
        );
        assert_eq!(by_title.len(), 1);

        let by_description = filter_books(
            &books,
            &FilterOptions { search: Some("sandworms".to_string()), ..Default::default() },
        );
        assert_eq!(by_description.len(), 1);

        let by_author = filter_books(
            &books,
            &FilterOptions { search: Some("author".to_string()), ..Default::default() },
        );
        assert_eq!(by_author.len(), 3);
    }

    #[test]
    fn random_pick_comes_from_the_list_and_handles_empty() {
        assert!(pick_random(&[]).is_none());

        let books = library();
        for _ in 0..20 {
            let picked = pick_random(&books).unwrap();
            assert!(books.contains(picked));
        }
    }
}
