//! Book list/add/edit/delete handlers

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::books::{self, Book};
use crate::db::{authors, StoreError};
use crate::error::{ApiError, ApiResult};
use crate::forms::{BookForm, BookInput, FilterForm, AUTHOR_SLOTS};
use crate::AppState;

/// Book as served by the list and edit views
#[derive(Debug, Serialize)]
pub struct BookPayload {
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    pub publication_date: Option<NaiveDate>,
    pub isbn: Option<i64>,
    pub pages: Option<i64>,
    pub image_url: Option<String>,
    pub language: Option<String>,
}

impl BookPayload {
    pub async fn load(pool: &SqlitePool, book: Book) -> ApiResult<Self> {
        let authors = authors::authors_of_book(pool, book.id)
            .await?
            .into_iter()
            .map(|a| a.name)
            .collect();

        Ok(Self {
            id: book.id,
            title: book.title,
            authors,
            publication_date: book.publication_date,
            isbn: book.isbn,
            pages: book.pages,
            image_url: book.image_url,
            language: book.language,
        })
    }
}

/// GET /list/
///
/// Filtered book listing; filter predicates come from query parameters.
pub async fn book_list(
    State(state): State<AppState>,
    Query(filter_form): Query<FilterForm>,
) -> ApiResult<Json<Value>> {
    let filter = filter_form.clean().map_err(ApiError::Validation)?;
    let books = books::list_books(&state.db, &filter).await?;

    let mut payloads = Vec::with_capacity(books.len());
    for book in books {
        payloads.push(BookPayload::load(&state.db, book).await?);
    }

    Ok(Json(json!({ "books": payloads })))
}

/// GET /add/
///
/// Blank form descriptor: book fields plus the fixed author-name slots.
pub async fn book_add_form() -> Json<Value> {
    Json(json!({
        "form": {
            "title": "",
            "publication_date": "",
            "isbn": "",
            "pages": "",
            "image_url": "",
            "language": "",
        },
        "author_slots": AUTHOR_SLOTS,
    }))
}

/// POST /add/
///
/// Create a book with its author batch, then redirect to the list.
pub async fn book_add(
    State(state): State<AppState>,
    Form(form): Form<BookForm>,
) -> ApiResult<Redirect> {
    let input = form.clean().map_err(ApiError::Validation)?;

    let book = book_from_input(Uuid::new_v4(), &input);
    books::create_book(&state.db, &book).await?;
    link_authors(&state.db, book.id, &input.authors).await?;

    tracing::info!(title = %book.title, id = %book.id, "Book added");

    Ok(Redirect::to("/list/"))
}

/// GET /edit/:id/
///
/// Current field values plus linked author names, as form initial data.
pub async fn book_edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let book = books::get_book(&state.db, id).await?;
    let payload = BookPayload::load(&state.db, book).await?;

    Ok(Json(json!({
        "form": payload,
        "author_slots": AUTHOR_SLOTS,
    })))
}

/// POST /edit/:id/
///
/// Full replace of the book's fields and of its author set.
pub async fn book_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<BookForm>,
) -> ApiResult<Redirect> {
    // 404 before validation when the id is unknown
    books::get_book(&state.db, id).await?;

    let input = form.clean().map_err(ApiError::Validation)?;

    let book = book_from_input(id, &input);
    books::update_book(&state.db, &book).await?;

    authors::unlink_book_authors(&state.db, id).await?;
    link_authors(&state.db, id, &input.authors).await?;

    tracing::info!(title = %book.title, id = %book.id, "Book updated");

    Ok(Redirect::to("/list/"))
}

/// GET /delete/:id/
///
/// Deletion confirmation payload; the delete itself requires the POST.
pub async fn book_delete_confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let book = books::get_book(&state.db, id).await?;
    let payload = BookPayload::load(&state.db, book).await?;

    Ok(Json(json!({
        "book": payload,
        "confirm": format!("POST /delete/{}/ to delete this book", id),
    })))
}

/// POST /delete/:id/
///
/// Remove the book and its author associations; authors persist.
pub async fn book_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Redirect> {
    books::delete_book(&state.db, id).await?;

    tracing::info!(id = %id, "Book deleted");

    Ok(Redirect::to("/list/"))
}

fn book_from_input(id: Uuid, input: &BookInput) -> Book {
    Book {
        id,
        title: input.title.clone(),
        publication_date: input.publication_date,
        isbn: input.isbn,
        pages: input.pages,
        image_url: input.image_url.clone(),
        language: input.language.clone(),
    }
}

async fn link_authors(pool: &SqlitePool, book_id: Uuid, names: &[String]) -> Result<(), StoreError> {
    for name in names {
        let author = authors::get_or_create_author(pool, name).await?;
        authors::link_book_author(pool, book_id, author.id).await?;
    }
    Ok(())
}
