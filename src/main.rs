//! bookdex - Book catalog management service
//!
//! CRUD surface for books and authors, filtered listings, a read-only JSON
//! API, and bulk import from the Google Books volumes API.

use anyhow::Result;
use tracing::info;

use bookdex::config::Config;
use bookdex::services::google_books::GoogleBooksClient;
use bookdex::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting bookdex v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = bookdex::db::init_database_pool(&config.db_path).await?;
    info!("Database connection established");

    let books_api = GoogleBooksClient::with_base_url(&config.books_api_url)?;

    let state = AppState::new(pool, books_api);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("bookdex listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
