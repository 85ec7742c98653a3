//! Author database operations
//!
//! Authors are looked up by exact name and created on demand, both from the
//! book forms and from the import routine. There is no uniqueness constraint
//! on `name`; `get_or_create` returns the first match when duplicates exist.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Author record
#[derive(Debug, Clone)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Save author to database
pub async fn create_author(pool: &SqlitePool, author: &Author) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO authors (id, name, created_at, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(author.id.to_string())
    .bind(&author.name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load author by id
pub async fn get_author(pool: &SqlitePool, id: Uuid) -> StoreResult<Author> {
    let row = sqlx::query("SELECT id, name FROM authors WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => row_to_author(&row),
        None => Err(StoreError::NotFound(format!("author {}", id))),
    }
}

/// Find author by exact name match
///
/// Returns the first match when several authors share a name.
pub async fn find_author_by_name(pool: &SqlitePool, name: &str) -> StoreResult<Option<Author>> {
    let row = sqlx::query("SELECT id, name FROM authors WHERE name = ? LIMIT 1")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(row_to_author(&row)?)),
        None => Ok(None),
    }
}

/// Look up author by exact name, creating one if absent
pub async fn get_or_create_author(pool: &SqlitePool, name: &str) -> StoreResult<Author> {
    if let Some(existing) = find_author_by_name(pool, name).await? {
        return Ok(existing);
    }

    let author = Author::new(name);
    create_author(pool, &author).await?;
    tracing::debug!(name = %author.name, "Created author");
    Ok(author)
}

/// List all authors, ordered by name
pub async fn list_authors(pool: &SqlitePool) -> StoreResult<Vec<Author>> {
    let rows = sqlx::query("SELECT id, name FROM authors ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_author).collect()
}

/// Associate book with author
///
/// Idempotent: repeated links for the same pair are ignored.
pub async fn link_book_author(
    pool: &SqlitePool,
    book_id: Uuid,
    author_id: Uuid,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO book_authors (book_id, author_id, created_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(book_id, author_id) DO NOTHING
        "#,
    )
    .bind(book_id.to_string())
    .bind(author_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove all author associations for a book
///
/// Used by edit (full replace of the author set) and delete. Author rows are
/// never touched.
pub async fn unlink_book_authors(pool: &SqlitePool, book_id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
        .bind(book_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Load authors linked to a book, ordered by name
pub async fn authors_of_book(pool: &SqlitePool, book_id: Uuid) -> StoreResult<Vec<Author>> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.name
        FROM authors a
        JOIN book_authors ba ON ba.author_id = a.id
        WHERE ba.book_id = ?
        ORDER BY a.name
        "#,
    )
    .bind(book_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_author).collect()
}

fn row_to_author(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Author> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

    Ok(Author {
        id,
        name: row.get("name"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_find_author() {
        let pool = test_pool().await;

        let author = Author::new("Dan Brown");
        create_author(&pool, &author).await.expect("Failed to save author");

        let found = find_author_by_name(&pool, "Dan Brown")
            .await
            .expect("Lookup failed")
            .expect("Author not found");

        assert_eq!(found.id, author.id);
        assert_eq!(found.name, "Dan Brown");
    }

    #[tokio::test]
    async fn test_get_or_create_is_lookup_first() {
        let pool = test_pool().await;

        let first = get_or_create_author(&pool, "J. K. Rowling")
            .await
            .expect("First get_or_create failed");
        let second = get_or_create_author(&pool, "J. K. Rowling")
            .await
            .expect("Second get_or_create failed");

        assert_eq!(first.id, second.id);
        assert_eq!(list_authors(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let pool = test_pool().await;

        let author = get_or_create_author(&pool, "Dan Brown").await.unwrap();
        let book_id = Uuid::new_v4();

        link_book_author(&pool, book_id, author.id).await.unwrap();
        link_book_author(&pool, book_id, author.id).await.unwrap();

        let linked = authors_of_book(&pool, book_id).await.unwrap();
        assert_eq!(linked.len(), 1);
    }
}
