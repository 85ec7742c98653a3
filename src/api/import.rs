//! Search-and-import handlers
//!
//! The POST validates the search form, queries the metadata service, imports
//! matching volumes, and redirects to the list view either way. The import
//! count is deliberately not surfaced; skipped items (missing title/ISBN,
//! duplicate ISBN) stay silent.

use axum::{extract::State, response::Redirect, Form, Json};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::forms::SearchForm;
use crate::services::google_books;
use crate::AppState;

/// GET /import/
///
/// Search form descriptor with the field length caps.
pub async fn import_form() -> Json<Value> {
    Json(json!({
        "form": {
            "key_word": { "max_length": 100 },
            "title": { "max_length": 100 },
            "author": { "max_length": 100 },
            "isbn": { "max_length": 13 },
        }
    }))
}

/// POST /import/
///
/// An invalid form skips the import but still redirects; upstream network or
/// decode failures propagate and fail the request.
pub async fn book_import(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> ApiResult<Redirect> {
    match form.clean() {
        Ok(search) => {
            let response = state.books_api.search(&search).await?;
            let imported = google_books::import_volumes(&state.db, &response).await?;
            tracing::info!(imported, "Import finished");
        }
        Err(errors) => {
            tracing::warn!(?errors, "Import form invalid; nothing imported");
        }
    }

    Ok(Redirect::to("/list/"))
}
