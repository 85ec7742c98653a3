//! Read-only JSON catalog listing
//!
//! Serves the same filter predicates as the list view, without the opaque ids
//! or any mutation surface.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{authors, books};
use crate::error::{ApiError, ApiResult};
use crate::forms::FilterForm;
use crate::AppState;

/// Book as serialized by the read-only API
#[derive(Debug, Serialize)]
pub struct ApiBook {
    pub title: String,
    pub authors: Vec<String>,
    pub publication_date: Option<NaiveDate>,
    pub isbn: Option<i64>,
    pub pages: Option<i64>,
    pub image_url: Option<String>,
    pub language: Option<String>,
}

/// GET /api/
pub async fn api_book_list(
    State(state): State<AppState>,
    Query(filter_form): Query<FilterForm>,
) -> ApiResult<Json<Vec<ApiBook>>> {
    let filter = filter_form.clean().map_err(ApiError::Validation)?;
    let records = books::list_books(&state.db, &filter).await?;

    let mut payload = Vec::with_capacity(records.len());
    for book in records {
        let authors = authors::authors_of_book(&state.db, book.id)
            .await?
            .into_iter()
            .map(|a| a.name)
            .collect();

        payload.push(ApiBook {
            title: book.title,
            authors,
            publication_date: book.publication_date,
            isbn: book.isbn,
            pages: book.pages,
            image_url: book.image_url,
            language: book.language,
        });
    }

    Ok(Json(payload))
}
