//! Form and filter validation
//!
//! Form-encoded input arrives as strings; each form type here carries the raw
//! fields and a `clean()` that produces the typed input or a set of
//! field-level error messages. Mirrors the submit/redisplay cycle of the web
//! forms: on error the caller echoes the messages back per field.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::books::BookFilter;

/// Number of author-name slots submitted alongside a book
pub const AUTHOR_SLOTS: usize = 3;

const MAX_TITLE_LEN: usize = 200;
const MAX_AUTHOR_NAME_LEN: usize = 200;
const MAX_IMAGE_URL_LEN: usize = 1000;
const MAX_LANGUAGE_LEN: usize = 20;
const MAX_SEARCH_TERM_LEN: usize = 100;
const MAX_SEARCH_ISBN_LEN: usize = 13;

/// Per-field validation messages, keyed by field name
#[derive(Debug, Default, Serialize)]
pub struct ValidationErrors(pub BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Cleaned book input: typed fields plus the author names to associate
#[derive(Debug, Clone, PartialEq)]
pub struct BookInput {
    pub title: String,
    pub publication_date: Option<NaiveDate>,
    pub isbn: Option<i64>,
    pub pages: Option<i64>,
    pub image_url: Option<String>,
    pub language: Option<String>,
    /// Non-empty author-name slots, in slot order
    pub authors: Vec<String>,
}

/// Raw book form: all fields optional strings, cleaned by `clean()`
///
/// Carries the fixed 3-slot author batch alongside the book fields.
#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub pages: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub author_name_1: String,
    #[serde(default)]
    pub author_name_2: String,
    #[serde(default)]
    pub author_name_3: String,
}

impl BookForm {
    pub fn clean(&self) -> Result<BookInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.add("title", "This field is required");
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.add(
                "title",
                format!("Ensure this value has at most {} characters", MAX_TITLE_LEN),
            );
        }

        let publication_date = match parse_optional_date(&self.publication_date) {
            Ok(date) => date,
            Err(msg) => {
                errors.add("publication_date", msg);
                None
            }
        };

        let isbn = match parse_optional_int(&self.isbn) {
            Ok(value) => value,
            Err(()) => {
                errors.add("isbn", "Enter a whole number");
                None
            }
        };

        let pages = match parse_optional_int(&self.pages) {
            Ok(Some(value)) if value < 0 => {
                errors.add("pages", "Pages number cannot be less than 0");
                None
            }
            Ok(value) => value,
            Err(()) => {
                errors.add("pages", "Enter a whole number");
                None
            }
        };

        let image_url = non_empty_str(&self.image_url);
        if let Some(url) = &image_url {
            if url.chars().count() > MAX_IMAGE_URL_LEN {
                errors.add(
                    "image_url",
                    format!("Ensure this value has at most {} characters", MAX_IMAGE_URL_LEN),
                );
            }
        }

        let language = non_empty_str(&self.language);
        if let Some(lang) = &language {
            if lang.chars().count() > MAX_LANGUAGE_LEN {
                errors.add(
                    "language",
                    format!("Ensure this value has at most {} characters", MAX_LANGUAGE_LEN),
                );
            }
        }

        let mut authors = Vec::new();
        let slots = [
            ("author_name_1", &self.author_name_1),
            ("author_name_2", &self.author_name_2),
            ("author_name_3", &self.author_name_3),
        ];
        for (field, raw) in slots {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            if name.chars().count() > MAX_AUTHOR_NAME_LEN {
                errors.add(
                    field,
                    format!("Ensure this value has at most {} characters", MAX_AUTHOR_NAME_LEN),
                );
                continue;
            }
            authors.push(name.to_string());
        }

        errors.into_result(BookInput {
            title,
            publication_date,
            isbn,
            pages,
            image_url,
            language,
            authors,
        })
    }
}

/// Standalone author form (`/author/add`)
#[derive(Debug, Default, Deserialize)]
pub struct AuthorForm {
    #[serde(default)]
    pub name: String,
}

impl AuthorForm {
    /// Name is optional; empty submissions are the caller's concern
    pub fn clean(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = self.name.trim().to_string();
        if name.chars().count() > MAX_AUTHOR_NAME_LEN {
            errors.add(
                "name",
                format!("Ensure this value has at most {} characters", MAX_AUTHOR_NAME_LEN),
            );
        }
        errors.into_result(name)
    }
}

/// Cleaned metadata-search input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInput {
    pub key_word: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// Metadata-search form (`/import/`): all fields optional, length-capped
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub key_word: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
}

impl SearchForm {
    pub fn clean(&self) -> Result<SearchInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let caps = [
            ("key_word", &self.key_word, MAX_SEARCH_TERM_LEN),
            ("title", &self.title, MAX_SEARCH_TERM_LEN),
            ("author", &self.author, MAX_SEARCH_TERM_LEN),
            ("isbn", &self.isbn, MAX_SEARCH_ISBN_LEN),
        ];
        for (field, value, cap) in caps {
            if value.chars().count() > cap {
                errors.add(
                    field,
                    format!("Ensure this value has at most {} characters", cap),
                );
            }
        }

        errors.into_result(SearchInput {
            key_word: self.key_word.trim().to_string(),
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
        })
    }
}

/// Raw filter query parameters for the list and API views
///
/// The date bounds go out on the wire as `publication_date__gt` /
/// `publication_date__lt`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "publication_date__gt")]
    pub published_after: Option<String>,
    #[serde(rename = "publication_date__lt")]
    pub published_before: Option<String>,
}

impl FilterForm {
    pub fn clean(&self) -> Result<BookFilter, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let published_after = match parse_optional_date(self.published_after.as_deref().unwrap_or(""))
        {
            Ok(date) => date,
            Err(msg) => {
                errors.add("publication_date__gt", msg);
                None
            }
        };
        let published_before =
            match parse_optional_date(self.published_before.as_deref().unwrap_or("")) {
                Ok(date) => date,
                Err(msg) => {
                    errors.add("publication_date__lt", msg);
                    None
                }
            };

        errors.into_result(BookFilter {
            title: self.title.as_deref().and_then(non_empty_str),
            author: self.author.as_deref().and_then(non_empty_str),
            language: self.language.as_deref().and_then(non_empty_str),
            published_after,
            published_before,
        })
    }
}

fn non_empty_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Enter a valid date (YYYY-MM-DD)")
}

fn parse_optional_int(raw: &str) -> Result<Option<i64>, ()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<i64>().map(Some).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_book_form() -> BookForm {
        BookForm {
            title: "The Da Vinci Code".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_title_required() {
        let form = BookForm::default();
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("title"));
    }

    #[test]
    fn test_minimal_valid_book() {
        let input = valid_book_form().clean().unwrap();
        assert_eq!(input.title, "The Da Vinci Code");
        assert_eq!(input.isbn, None);
        assert_eq!(input.pages, None);
        assert!(input.authors.is_empty());
    }

    #[test]
    fn test_pages_negative_rejected_with_pages_error() {
        let mut form = valid_book_form();
        form.pages = "-1".to_string();
        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.0.get("pages").map(|msgs| msgs[0].as_str()),
            Some("Pages number cannot be less than 0")
        );
    }

    #[test]
    fn test_pages_zero_and_positive_accepted() {
        let mut form = valid_book_form();
        form.pages = "0".to_string();
        assert_eq!(form.clean().unwrap().pages, Some(0));

        form.pages = "689".to_string();
        assert_eq!(form.clean().unwrap().pages, Some(689));
    }

    #[test]
    fn test_pages_non_numeric_rejected() {
        let mut form = valid_book_form();
        form.pages = "many".to_string();
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("pages"));
    }

    #[test]
    fn test_isbn_must_parse_as_integer() {
        let mut form = valid_book_form();
        form.isbn = "not-a-number".to_string();
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("isbn"));

        form.isbn = "1234567890".to_string();
        assert_eq!(form.clean().unwrap().isbn, Some(1234567890));
    }

    #[test]
    fn test_publication_date_parsing() {
        let mut form = valid_book_form();
        form.publication_date = "2020-05-07".to_string();
        assert_eq!(
            form.clean().unwrap().publication_date,
            NaiveDate::from_ymd_opt(2020, 5, 7)
        );

        form.publication_date = "May 2020".to_string();
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("publication_date"));
    }

    #[test]
    fn test_author_slots_skip_empty() {
        let mut form = valid_book_form();
        form.author_name_1 = "Dan Brown".to_string();
        form.author_name_3 = "  ".to_string();
        let input = form.clean().unwrap();
        assert_eq!(input.authors, vec!["Dan Brown".to_string()]);
    }

    #[test]
    fn test_all_author_slots_collected_in_order() {
        let mut form = valid_book_form();
        form.author_name_1 = "First".to_string();
        form.author_name_2 = "Second".to_string();
        form.author_name_3 = "Third".to_string();
        let input = form.clean().unwrap();
        assert_eq!(input.authors, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_image_url_length_cap() {
        let mut form = valid_book_form();
        form.image_url = "x".repeat(1001);
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("image_url"));

        form.image_url = "x".repeat(1000);
        assert!(form.clean().is_ok());
    }

    #[test]
    fn test_length_caps_count_characters_not_bytes() {
        // 100 two-byte characters fit the 100-character search cap
        let form = SearchForm {
            key_word: "ż".repeat(100),
            ..Default::default()
        };
        assert!(form.clean().is_ok());

        let form = SearchForm {
            key_word: "ż".repeat(101),
            ..Default::default()
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("key_word"));

        let mut form = valid_book_form();
        form.title = "ż".repeat(200);
        assert!(form.clean().is_ok());

        form.title = "ż".repeat(201);
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("title"));
    }

    #[test]
    fn test_search_form_length_caps() {
        let form = SearchForm {
            key_word: "k".repeat(101),
            isbn: "1".repeat(14),
            ..Default::default()
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("key_word"));
        assert!(errors.0.contains_key("isbn"));

        let form = SearchForm {
            key_word: "k".repeat(100),
            isbn: "1".repeat(13),
            ..Default::default()
        };
        assert!(form.clean().is_ok());
    }

    #[test]
    fn test_filter_form_empty_params_mean_no_filter() {
        let filter = FilterForm::default().clean().unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_filter_form_date_bounds() {
        let form = FilterForm {
            published_after: Some("2000-01-01".to_string()),
            published_before: Some("not-a-date".to_string()),
            ..Default::default()
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.0.contains_key("publication_date__lt"));
        assert!(!errors.0.contains_key("publication_date__gt"));
    }

    #[test]
    fn test_author_form_name_optional() {
        let name = AuthorForm::default().clean().unwrap();
        assert_eq!(name, "");
    }
}
