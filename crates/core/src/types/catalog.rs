//! Catalog payloads: books and genres.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, GenreId, Price};

/// Stock level below which the storefront shows an "only N left" badge.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Price,
    /// Genre name the book is filed under.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
    /// Cover image URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Book {
    /// Whether at least one copy is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the book is in stock but running low.
    #[must_use]
    pub const fn low_stock(&self) -> bool {
        self.stock > 0 && self.stock < LOW_STOCK_THRESHOLD
    }

    /// Value of the remaining stock at list price.
    #[must_use]
    pub fn stock_value(&self) -> Price {
        self.price.times(self.stock)
    }

    /// The editable fields of this book, for update requests.
    #[must_use]
    pub fn to_input(&self) -> BookInput {
        BookInput {
            title: self.title.clone(),
            author: self.author.clone(),
            price: self.price,
            category: self.category.clone(),
            stock: self.stock,
            image: self.image.clone(),
            description: self.description.clone(),
        }
    }
}

/// Fields for creating or updating a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub price: Price,
    pub category: String,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A catalog genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields for creating or updating a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreInput {
    pub name: String,
    pub description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn book(stock: u32) -> Book {
        Book {
            id: BookId::new("b1"),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            price: Price::from_cents(999),
            category: "Science Fiction".to_string(),
            stock,
            image: None,
            description: None,
        }
    }

    #[test]
    fn test_stock_flags() {
        assert!(!book(0).in_stock());
        assert!(!book(0).low_stock());
        assert!(book(4).low_stock());
        assert!(!book(5).low_stock());
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(book(3).stock_value(), Price::from_cents(2997));
    }

    #[test]
    fn test_deserialize_api_book() {
        let json = r#"{"id":"b7","title":"Emma","author":"Jane Austen","price":7.5,
            "category":"Classics","stock":2,"image":"https://img/emma.png"}"#;
        let parsed: Book = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id.as_str(), "b7");
        assert_eq!(parsed.price, Price::from_cents(750));
        assert_eq!(parsed.image.as_deref(), Some("https://img/emma.png"));
        assert!(parsed.description.is_none());
    }

    #[test]
    fn test_genre_created_at() {
        let json = r#"{"id":"g1","name":"Poetry","description":"Verse","createdAt":"2024-05-01T10:00:00Z"}"#;
        let genre: Genre = serde_json::from_str(json).unwrap();
        assert_eq!(genre.name, "Poetry");
        assert!(genre.created_at.is_some());
    }
}
