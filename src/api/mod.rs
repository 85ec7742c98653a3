//! HTTP handlers for bookdex
//!
//! Form POSTs keep classic web-form semantics: redirect to the list view on
//! success, field-level errors on validation failure. GET endpoints serve
//! JSON payloads (page rendering is out of scope).

pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
pub mod import;

pub use health::health_routes;
