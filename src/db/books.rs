//! Book database operations
//!
//! Books carry an opaque UUID id assigned at creation. The 10-or-13-digit
//! ISBN rule and the non-negative pages rule are enforced here, at write
//! time, for both create and update.

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Book record
#[derive(Debug, Clone)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub publication_date: Option<NaiveDate>,
    pub isbn: Option<i64>,
    pub pages: Option<i64>,
    pub image_url: Option<String>,
    pub language: Option<String>,
}

impl Book {
    /// Create a new book record with a fresh id and no optional metadata
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            publication_date: None,
            isbn: None,
            pages: None,
            image_url: None,
            language: None,
        }
    }
}

/// Filter predicates for book listings
///
/// Shared by the list view and the read-only API listing.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring match on title
    pub title: Option<String>,
    /// Exact match against an author's name (join key)
    pub author: Option<String>,
    /// Case-insensitive substring match on language
    pub language: Option<String>,
    /// Strictly after
    pub published_after: Option<NaiveDate>,
    /// Strictly before
    pub published_before: Option<NaiveDate>,
}

impl BookFilter {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.language.is_none()
            && self.published_after.is_none()
            && self.published_before.is_none()
    }
}

/// ISBN must serialize to a 10- or 13-digit decimal string
pub fn isbn_is_valid(isbn: i64) -> bool {
    let digits = isbn.to_string();
    digits.len() == 10 || digits.len() == 13
}

fn check_invariants(book: &Book) -> StoreResult<()> {
    if let Some(isbn) = book.isbn {
        if !isbn_is_valid(isbn) {
            return Err(StoreError::InvalidIsbn(isbn));
        }
    }
    if let Some(pages) = book.pages {
        if pages < 0 {
            return Err(StoreError::InvalidPages(pages));
        }
    }
    Ok(())
}

/// Save a new book to the database
pub async fn create_book(pool: &SqlitePool, book: &Book) -> StoreResult<()> {
    check_invariants(book)?;

    sqlx::query(
        r#"
        INSERT INTO books (
            id, title, publication_date, isbn, pages, image_url, language,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(book.id.to_string())
    .bind(&book.title)
    .bind(book.publication_date.map(|d| d.to_string()))
    .bind(book.isbn)
    .bind(book.pages)
    .bind(&book.image_url)
    .bind(&book.language)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load book by id
pub async fn get_book(pool: &SqlitePool, id: Uuid) -> StoreResult<Book> {
    let row = sqlx::query(
        r#"
        SELECT id, title, publication_date, isbn, pages, image_url, language
        FROM books
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => row_to_book(&row),
        None => Err(StoreError::NotFound(format!("book {}", id))),
    }
}

/// Full-replace update of a book's fields (author set handled separately)
pub async fn update_book(pool: &SqlitePool, book: &Book) -> StoreResult<()> {
    check_invariants(book)?;

    let result = sqlx::query(
        r#"
        UPDATE books SET
            title = ?,
            publication_date = ?,
            isbn = ?,
            pages = ?,
            image_url = ?,
            language = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&book.title)
    .bind(book.publication_date.map(|d| d.to_string()))
    .bind(book.isbn)
    .bind(book.pages)
    .bind(&book.image_url)
    .bind(&book.language)
    .bind(book.id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("book {}", book.id)));
    }

    Ok(())
}

/// Delete a book and its author associations
///
/// Author rows persist; only join rows are removed.
pub async fn delete_book(pool: &SqlitePool, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("book {}", id)));
    }

    super::authors::unlink_book_authors(pool, id).await?;

    Ok(())
}

/// Check whether a book with this ISBN already exists (import dedup key)
pub async fn exists_by_isbn(pool: &SqlitePool, isbn: i64) -> StoreResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE isbn = ?")
        .bind(isbn)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// List books matching the filter, oldest first
pub async fn list_books(pool: &SqlitePool, filter: &BookFilter) -> StoreResult<Vec<Book>> {
    let mut sql = String::from(
        "SELECT DISTINCT b.id, b.title, b.publication_date, b.isbn, b.pages, \
         b.image_url, b.language, b.created_at FROM books b",
    );
    let mut conditions: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if filter.author.is_some() {
        sql.push_str(
            " JOIN book_authors ba ON ba.book_id = b.id \
             JOIN authors a ON a.id = ba.author_id",
        );
    }

    if let Some(title) = &filter.title {
        conditions.push("LOWER(b.title) LIKE '%' || LOWER(?) || '%'");
        binds.push(title.clone());
    }
    if let Some(author) = &filter.author {
        conditions.push("a.name = ?");
        binds.push(author.clone());
    }
    if let Some(language) = &filter.language {
        conditions.push("LOWER(b.language) LIKE '%' || LOWER(?) || '%'");
        binds.push(language.clone());
    }
    if let Some(after) = filter.published_after {
        conditions.push("b.publication_date > ?");
        binds.push(after.to_string());
    }
    if let Some(before) = filter.published_before {
        conditions.push("b.publication_date < ?");
        binds.push(before.to_string());
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY b.created_at, b.title");

    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = query.bind(bind);
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(row_to_book).collect()
}

fn row_to_book(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Book> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

    let date_str: Option<String> = row.get("publication_date");
    let publication_date = match date_str {
        Some(s) => Some(
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
        ),
        None => None,
    };

    Ok(Book {
        id,
        title: row.get("title"),
        publication_date,
        isbn: row.get("isbn"),
        pages: row.get("pages"),
        image_url: row.get("image_url"),
        language: row.get("language"),
    })
}
