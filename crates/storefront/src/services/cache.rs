//! Cache types for catalog responses.

use bookstore_core::{Book, BookId, Genre, GenreId};

/// Cache key for books and genres.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Book(BookId),
    Books { category: Option<String> },
    Genre(GenreId),
    Genres,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Book(Box<Book>),
    Books(Vec<Book>),
    Genre(Box<Genre>),
    Genres(Vec<Genre>),
}
