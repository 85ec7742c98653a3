//! External service clients for bookdex

pub mod google_books;
