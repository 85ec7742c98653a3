//! Google Books API client and catalog import
//!
//! Builds a volumes search query from the import form, fetches the result
//! payload, and materializes matching volumes into the catalog. Items missing
//! a title or a usable numeric ISBN are skipped, as are ISBNs already in the
//! store; authors are looked up by exact name and created on demand.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::time::Duration;
use thiserror::Error;

use crate::db::books::{self, Book};
use crate::db::{authors, StoreError};
use crate::forms::SearchInput;

pub const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const USER_AGENT: &str = concat!("bookdex/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Google Books client errors
#[derive(Debug, Error)]
pub enum GoogleBooksError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Volumes search response
#[derive(Debug, Clone, Deserialize)]
pub struct VolumesResponse {
    #[serde(rename = "totalItems")]
    pub total_items: i64,
    /// Absent when totalItems is zero
    pub items: Option<Vec<Volume>>,
}

/// One search result item
#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
}

/// Volume metadata as returned by the volumes API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    #[serde(rename = "industryIdentifiers")]
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    #[serde(rename = "pageCount")]
    pub page_count: Option<i64>,
    pub language: Option<String>,
    #[serde(rename = "imageLinks")]
    pub image_links: Option<ImageLinks>,
}

/// Identifier entry (ISBN_10, ISBN_13, or other schemes)
#[derive(Debug, Clone, Deserialize)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub id_type: String,
    pub identifier: String,
}

/// Cover image links
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail")]
    pub small_thumbnail: Option<String>,
}

/// Build the volumes search query string
///
/// The keyword term always follows `?q=`; scoped clauses are appended only
/// when non-empty, in the fixed order title, author, isbn. The volumes API
/// accepts this grammar without URL encoding.
pub fn build_query(base_url: &str, search: &SearchInput) -> String {
    let mut query = format!("{}?q={}", base_url, search.key_word);

    if !search.title.is_empty() {
        query.push_str(&format!("+intitle:{}", search.title));
    }
    if !search.author.is_empty() {
        query.push_str(&format!("+inauthor:{}", search.author));
    }
    if !search.isbn.is_empty() {
        query.push_str(&format!("+isbn:{}", search.isbn));
    }

    query
}

/// Pick the best ISBN from the identifier list
///
/// The longest identifier whose declared type contains "ISBN" wins, so an
/// ISBN-13 beats an ISBN-10 when both are offered. Non-numeric winners count
/// as absent.
pub fn select_isbn(info: &VolumeInfo) -> Option<i64> {
    let identifiers = info.industry_identifiers.as_ref()?;

    let mut best = "";
    for id in identifiers {
        if id.identifier.len() > best.len() && id.id_type.contains("ISBN") {
            best = &id.identifier;
        }
    }

    best.parse::<i64>().ok()
}

/// Normalize publishedDate to a full calendar date
///
/// A 10-character value is used as-is, a 7-character year-month value gets
/// `-01` appended, anything else (including a bare year) gets `-01-01`.
/// Values that still don't parse afterwards are dropped.
pub fn select_date(info: &VolumeInfo) -> Option<NaiveDate> {
    let raw = info.published_date.as_deref()?;

    let padded = match raw.len() {
        10 => raw.to_string(),
        7 => format!("{}-01", raw),
        _ => format!("{}-01-01", raw),
    };

    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").ok()
}

/// Pick the cover image, preferring the larger thumbnail
pub fn select_image_url(info: &VolumeInfo) -> Option<String> {
    let links = info.image_links.as_ref()?;
    links.thumbnail.clone().or_else(|| links.small_thumbnail.clone())
}

/// Google Books API client
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleBooksClient {
    /// Create a client against the production volumes endpoint
    pub fn new() -> Result<Self, GoogleBooksError> {
        Self::with_base_url(GOOGLE_BOOKS_BASE_URL)
    }

    /// Create a client against an alternate endpoint (tests, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, GoogleBooksError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GoogleBooksError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one volumes search
    ///
    /// One GET per call; failures propagate to the caller, no retry.
    pub async fn search(&self, search: &SearchInput) -> Result<VolumesResponse, GoogleBooksError> {
        let url = build_query(&self.base_url, search);

        tracing::debug!(url = %url, "Querying Google Books API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| GoogleBooksError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GoogleBooksError::Api(status.as_u16(), error_text));
        }

        let volumes: VolumesResponse = response
            .json()
            .await
            .map_err(|e| GoogleBooksError::Parse(e.to_string()))?;

        tracing::info!(total_items = volumes.total_items, "Retrieved volumes from Google Books");

        Ok(volumes)
    }
}

/// Materialize search results into the catalog
///
/// Returns the count of newly created books. Items without a title or a valid
/// numeric ISBN are skipped silently, as are ISBNs already present. Authors
/// created along the way are not counted.
pub async fn import_volumes(
    pool: &SqlitePool,
    response: &VolumesResponse,
) -> Result<u64, StoreError> {
    let mut imported = 0u64;

    if response.total_items == 0 {
        return Ok(0);
    }

    let items = response.items.as_deref().unwrap_or_default();
    for item in items {
        let info = &item.volume_info;

        let (title, isbn) = match (&info.title, select_isbn(info)) {
            (Some(title), Some(isbn)) => (title.clone(), isbn),
            _ => continue,
        };

        // A numeric identifier that still isn't a 10- or 13-digit ISBN
        // (leading-zero ISBN-10s lose a digit when parsed) counts as absent;
        // the item is skipped, not the whole import
        if !books::isbn_is_valid(isbn) {
            tracing::debug!(isbn, "Skipping volume: identifier is not a usable ISBN");
            continue;
        }

        if books::exists_by_isbn(pool, isbn).await? {
            tracing::debug!(isbn, "Skipping volume: ISBN already in catalog");
            continue;
        }

        let mut book = Book::new(title);
        book.publication_date = select_date(info);
        book.isbn = Some(isbn);
        book.pages = info.page_count;
        book.image_url = select_image_url(info);
        book.language = info.language.clone();

        books::create_book(pool, &book).await?;
        imported += 1;

        for name in info.authors.as_deref().unwrap_or_default() {
            let author = authors::get_or_create_author(pool, name).await?;
            authors::link_book_author(pool, book.id, author.id).await?;
        }

        tracing::debug!(title = %book.title, isbn, "Imported book");
    }

    Ok(imported)
}
