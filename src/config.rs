//! Configuration resolution for bookdex
//!
//! Three settings, each an environment variable with a default. Values are
//! logged at startup so a misconfigured deployment is visible immediately.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::services::google_books::GOOGLE_BOOKS_BASE_URL;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_PATH: &str = "bookdex.db";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (`BOOKDEX_PORT`)
    pub port: u16,
    /// Catalog database path (`BOOKDEX_DB`)
    pub db_path: PathBuf,
    /// Volumes search endpoint (`BOOKDEX_BOOKS_API_URL`)
    pub books_api_url: String,
}

impl Config {
    /// Resolve configuration from the environment
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("BOOKDEX_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("BOOKDEX_PORT is not a valid port: {}", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let db_path = std::env::var("BOOKDEX_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH));

        let books_api_url = std::env::var("BOOKDEX_BOOKS_API_URL")
            .unwrap_or_else(|_| GOOGLE_BOOKS_BASE_URL.to_string());

        let config = Self {
            port,
            db_path,
            books_api_url,
        };

        info!("Port: {}", config.port);
        info!("Database: {}", config.db_path.display());
        info!("Books API: {}", config.books_api_url);

        Ok(config)
    }
}
