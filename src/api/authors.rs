//! Standalone author-add handlers

use axum::{extract::State, response::Redirect, Form, Json};
use serde_json::{json, Value};

use crate::db::authors::{create_author, Author};
use crate::error::{ApiError, ApiResult};
use crate::forms::AuthorForm;
use crate::AppState;

/// GET /author/add
pub async fn author_add_form() -> Json<Value> {
    Json(json!({
        "form": { "name": "" }
    }))
}

/// POST /author/add
///
/// Creates the author and redirects to the book list.
pub async fn author_add(
    State(state): State<AppState>,
    Form(form): Form<AuthorForm>,
) -> ApiResult<Redirect> {
    let name = form.clean().map_err(ApiError::Validation)?;

    let author = Author::new(name);
    create_author(&state.db, &author).await?;

    tracing::info!(name = %author.name, id = %author.id, "Author added");

    Ok(Redirect::to("/list/"))
}
