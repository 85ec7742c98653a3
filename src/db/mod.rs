//! Database access for bookdex
//!
//! Shared SQLite database holding the book catalog. Tables are created on
//! startup if missing; the pool is shared across all HTTP handlers.

pub mod authors;
pub mod books;

use sqlx::SqlitePool;
use std::path::Path;
use thiserror::Error;

/// Store-level errors
///
/// Write-time invariant violations get their own variants so handlers can map
/// them to client-facing responses instead of a blanket 500.
#[derive(Debug, Error)]
pub enum StoreError {
    /// ISBN does not serialize to a 10- or 13-digit decimal string
    #[error("{0} is not a valid ISBN number")]
    InvalidIsbn(i64),

    /// Negative page count
    #[error("Pages number cannot be less than 0 (got {0})")]
    InvalidPages(i64),

    /// Row lookup by id came up empty
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Initialize database connection pool
///
/// Connects to the catalog database at `db_path`, creating file and tables
/// as needed.
pub async fn init_database_pool(db_path: &Path) -> StoreResult<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| StoreError::Database(sqlx::Error::Io(e)))?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create catalog tables if they don't exist
///
/// `books` and `authors` carry opaque UUID primary keys; `book_authors` is the
/// join table for the many-to-many relationship. Deleting a book removes its
/// join rows only, never the author rows.
pub async fn init_tables(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            publication_date TEXT,
            isbn INTEGER,
            pages INTEGER CHECK (pages IS NULL OR pages >= 0),
            image_url TEXT,
            language TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_authors (
            book_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (book_id, author_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (books, authors, book_authors)");

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    init_tables(&pool).await.expect("Schema initialization failed");
    pool
}
