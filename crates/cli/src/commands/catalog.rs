//! Catalog browsing commands.

use bookstore_core::{Book, BookId};
use bookstore_storefront::services::catalog::inventory_value;

use super::{App, CliError};

#[allow(clippy::print_stdout)]
pub async fn list_books(app: &App, category: Option<&str>) -> Result<(), CliError> {
    let books = app.catalog.books(category).await?;
    if books.is_empty() {
        println!("No books found.");
        return Ok(());
    }

    for book in &books {
        println!("{}", book_line(book));
    }
    println!();
    println!("{} books, stock value {}", books.len(), inventory_value(&books));
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn show_book(app: &App, id: &str) -> Result<(), CliError> {
    let book = app.catalog.book(&BookId::new(id)).await?;
    println!("{}", book_line(&book));
    if !book.category.is_empty() {
        println!("  Category: {}", book.category);
    }
    if let Some(description) = &book.description {
        println!("  {description}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn list_genres(app: &App) -> Result<(), CliError> {
    let genres = app.catalog.genres().await?;
    for genre in &genres {
        if genre.description.is_empty() {
            println!("{:<12} {}", genre.id, genre.name);
        } else {
            println!("{:<12} {} - {}", genre.id, genre.name, genre.description);
        }
    }
    Ok(())
}

fn book_line(book: &Book) -> String {
    let availability = if !book.in_stock() {
        "out of stock".to_string()
    } else if book.low_stock() {
        format!("only {} left", book.stock)
    } else {
        format!("{} in stock", book.stock)
    };
    format!(
        "{:<12} {:>9}  {} by {} ({availability})",
        book.id.as_str(),
        book.price.to_string(),
        book.title,
        book.author
    )
}
