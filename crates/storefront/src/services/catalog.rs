//! Catalog service: books and genres.
//!
//! Reads are cached with `moka` (5-minute TTL). Any create, update or delete
//! drops the whole catalog cache so lists never show stale entries.

use std::time::Duration;

use bookstore_core::{Book, BookId, BookInput, Genre, GenreId, GenreInput, Price};
use moka::future::Cache;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use crate::client::ApiClient;
use crate::error::Result;

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1000;

/// Books and genres, with cached reads.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct CatalogService {
    client: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("cached_entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { client, cache }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// List books, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn books(&self, category: Option<&str>) -> Result<Vec<Book>> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let key = CacheKey::Books {
            category: category.map(str::to_string),
        };
        if let Some(CacheValue::Books(books)) = self.cache.get(&key).await {
            debug!("Cache hit for books");
            return Ok(books);
        }

        let path = match category {
            Some(c) => format!("/books?category={}", urlencoding::encode(c)),
            None => "/books".to_string(),
        };
        let books: Vec<Book> = self.client.get(&path).await?;

        self.cache.insert(key, CacheValue::Books(books.clone())).await;
        Ok(books)
    }

    /// Get a book by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the book does not exist or the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn book(&self, id: &BookId) -> Result<Book> {
        let key = CacheKey::Book(id.clone());
        if let Some(CacheValue::Book(book)) = self.cache.get(&key).await {
            debug!("Cache hit for book");
            return Ok(*book);
        }

        let book: Book = self.client.get(&book_path(id)).await?;

        self.cache
            .insert(key, CacheValue::Book(Box::new(book.clone())))
            .await;
        Ok(book)
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the book.
    #[instrument(skip(self, book), fields(title = %book.title))]
    pub async fn create_book(&self, book: &BookInput) -> Result<Book> {
        let created = self.client.post("/books", book).await?;
        self.invalidate_all().await;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, book), fields(id = %id))]
    pub async fn update_book(&self, id: &BookId, book: &BookInput) -> Result<Book> {
        let updated = self.client.put(&book_path(id), book).await?;
        self.invalidate_all().await;
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_book(&self, id: &BookId) -> Result<()> {
        self.client.delete(&book_path(id)).await?;
        self.invalidate_all().await;
        Ok(())
    }

    // =========================================================================
    // Genres
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn genres(&self) -> Result<Vec<Genre>> {
        if let Some(CacheValue::Genres(genres)) = self.cache.get(&CacheKey::Genres).await {
            debug!("Cache hit for genres");
            return Ok(genres);
        }

        let genres: Vec<Genre> = self.client.get("/genres").await?;

        self.cache
            .insert(CacheKey::Genres, CacheValue::Genres(genres.clone()))
            .await;
        Ok(genres)
    }

    /// # Errors
    ///
    /// Returns an error if the genre does not exist or the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn genre(&self, id: &GenreId) -> Result<Genre> {
        let key = CacheKey::Genre(id.clone());
        if let Some(CacheValue::Genre(genre)) = self.cache.get(&key).await {
            debug!("Cache hit for genre");
            return Ok(*genre);
        }

        let genre: Genre = self.client.get(&genre_path(id)).await?;

        self.cache
            .insert(key, CacheValue::Genre(Box::new(genre.clone())))
            .await;
        Ok(genre)
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the genre.
    #[instrument(skip(self, genre), fields(name = %genre.name))]
    pub async fn create_genre(&self, genre: &GenreInput) -> Result<Genre> {
        let created = self.client.post("/genres", genre).await?;
        self.invalidate_all().await;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, genre), fields(id = %id))]
    pub async fn update_genre(&self, id: &GenreId, genre: &GenreInput) -> Result<Genre> {
        let updated = self.client.put(&genre_path(id), genre).await?;
        self.invalidate_all().await;
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_genre(&self, id: &GenreId) -> Result<()> {
        self.client.delete(&genre_path(id)).await?;
        self.invalidate_all().await;
        Ok(())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

/// Value of all listed stock at list price.
#[must_use]
pub fn inventory_value(books: &[Book]) -> Price {
    books.iter().map(Book::stock_value).sum()
}

fn book_path(id: &BookId) -> String {
    format!("/books/{}", urlencoding::encode(id.as_str()))
}

fn genre_path(id: &GenreId) -> String {
    format!("/genres/{}", urlencoding::encode(id.as_str()))
}
