//! Google Books volumes API client.

use super::classify::{classify_genre, detect_holiday_category};
use super::{BookMetadata, MetadataProvider};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const GOOGLE_BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct VolumesResponse {
    items: Option<Vec<Volume>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    categories: Option<Vec<String>>,
    description: Option<String>,
    image_links: Option<ImageLinks>,
    industry_identifiers: Option<Vec<IndustryIdentifier>>,
    published_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    id_type: Option<String>,
    identifier: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(LOOKUP_TIMEOUT).build()?;
        Ok(GoogleBooksClient {
            client,
            base_url: base_url.into(),
        })
    }
}

/// Thumbnails come back as plain http links; serve them over https.
fn https_upgrade(url: String) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{}", rest),
        None => url,
    }
}

fn pick_isbn(identifiers: &[IndustryIdentifier]) -> Option<String> {
    let find = |wanted: &str| {
        identifiers
            .iter()
            .find(|id| id.id_type.as_deref() == Some(wanted))
            .and_then(|id| id.identifier.clone())
    };
    find("ISBN_13").or_else(|| find("ISBN_10"))
}

fn year_from_published_date(published_date: &str) -> Option<i32> {
    published_date.split('-').next()?.parse().ok()
}

#[async_trait]
impl MetadataProvider for GoogleBooksClient {
    async fn lookup(&self, title: &str, author: &str) -> Result<BookMetadata> {
        let query = format!("{} {}", title, author);
        let url = format!(
            "{}/volumes?q={}&maxResults=1",
            self.base_url,
            urlencoding::encode(query.trim())
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Metadata lookup failed with status {}", response.status());
        }
        let body: VolumesResponse = response.json().await?;

        let info = match body
            .items
            .and_then(|items| items.into_iter().next())
            .and_then(|volume| volume.volume_info)
        {
            Some(info) => info,
            None => {
                return Ok(BookMetadata {
                    title: title.to_string(),
                    author: author.to_string(),
                    ..Default::default()
                })
            }
        };

        let resolved_title = info.title.unwrap_or_else(|| title.to_string());
        let description = info.description.unwrap_or_default();
        let categories = info.categories.unwrap_or_default();

        Ok(BookMetadata {
            genre: Some(classify_genre(&categories)),
            holiday_category: detect_holiday_category(&resolved_title, &description),
            cover_image_url: info
                .image_links
                .and_then(|links| links.thumbnail.or(links.small_thumbnail))
                .map(https_upgrade),
            isbn: info
                .industry_identifiers
                .as_deref()
                .and_then(pick_isbn),
            publication_year: info
                .published_date
                .as_deref()
                .and_then(year_from_published_date),
            description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
            author: info
                .authors
                .filter(|authors| !authors.is_empty())
                .map(|authors| authors.join(", "))
                .unwrap_or_else(|| author.to_string()),
            title: resolved_title,
        })
    }
}
