//! bookdex library interface
//!
//! Exposes the router and state for integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;

use crate::services::google_books::GoogleBooksClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog database connection pool
    pub db: SqlitePool,
    /// Google Books metadata client
    pub books_api: GoogleBooksClient,
}

impl AppState {
    pub fn new(db: SqlitePool, books_api: GoogleBooksClient) -> Self {
        Self { db, books_api }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/list/", get(api::books::book_list))
        .route(
            "/add/",
            get(api::books::book_add_form).post(api::books::book_add),
        )
        .route(
            "/edit/:id/",
            get(api::books::book_edit_form).post(api::books::book_edit),
        )
        .route(
            "/delete/:id/",
            get(api::books::book_delete_confirm).post(api::books::book_delete),
        )
        .route(
            "/import/",
            get(api::import::import_form).post(api::import::book_import),
        )
        .route(
            "/author/add",
            get(api::authors::author_add_form).post(api::authors::author_add),
        )
        .route("/api/", get(api::catalog::api_book_list))
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
