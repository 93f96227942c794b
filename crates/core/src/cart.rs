//! Shopping cart state.
//!
//! [`Cart`] is a plain value: every mutation is a synchronous, total function
//! of the current state and its input, so it can be driven directly or as a
//! reducer over [`CartAction`]s. Totals are derived from the lines on every
//! read and never stored.
//!
//! Invariants:
//! - at most one line per book id, in insertion order;
//! - every line has a quantity of at least 1 (a decrement to 0 removes it).

use std::num::NonZeroU32;

use serde::Serialize;

use crate::types::{Book, BookId, Price};

/// One book in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Price,
    pub image: Option<String>,
    quantity: NonZeroU32,
}

impl CartLine {
    /// A new line for `book` with a quantity of 1.
    #[must_use]
    pub fn new(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            price: book.price,
            image: book.image.clone(),
            quantity: NonZeroU32::MIN,
        }
    }

    /// Number of copies on this line (always at least 1).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity())
    }
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one copy of a book.
    Add(Book),
    /// Drop the line for a book.
    Remove(BookId),
    /// Change a line's quantity by `delta`.
    UpdateQuantity { id: BookId, delta: i64 },
    /// Empty the cart.
    Clear,
    /// Dismiss the "added to cart" notification.
    ClearLastAdded,
}

/// The cart lines plus the transient "last added" notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    last_added: Option<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            last_added: None,
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: &BookId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Snapshot of the most recently added or incremented line.
    #[must_use]
    pub const fn last_added(&self) -> Option<&CartLine> {
        self.last_added.as_ref()
    }

    /// Add one copy of `book`.
    ///
    /// Increments the existing line or appends a new one, and records the
    /// resulting line as [`last_added`](Self::last_added). Stock is not
    /// checked here.
    pub fn add(&mut self, book: &Book) {
        let snapshot = if let Some(line) = self.lines.iter_mut().find(|l| l.id == book.id) {
            line.quantity = line.quantity.saturating_add(1);
            line.clone()
        } else {
            let line = CartLine::new(book);
            self.lines.push(line.clone());
            line
        };
        self.last_added = Some(snapshot);
    }

    /// Remove the line for `id`. Returns `false` if there was none.
    pub fn remove(&mut self, id: &BookId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.id != id);
        self.lines.len() != before
    }

    /// Change the quantity of the line for `id` by `delta`.
    ///
    /// A resulting quantity of zero or less removes the line. Unknown ids
    /// leave the cart untouched. Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: &BookId, delta: i64) -> bool {
        let Some(pos) = self.lines.iter().position(|line| &line.id == id) else {
            return false;
        };
        if delta == 0 {
            return false;
        }

        let Some(line) = self.lines.get_mut(pos) else {
            return false;
        };
        let next = i64::from(line.quantity()).saturating_add(delta);
        match u32::try_from(next.min(i64::from(u32::MAX)))
            .ok()
            .and_then(NonZeroU32::new)
        {
            Some(quantity) => line.quantity = quantity,
            None => {
                self.lines.remove(pos);
            }
        }
        true
    }

    /// Remove every line and the last-added notification.
    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty() || self.last_added.is_some();
        self.lines.clear();
        self.last_added = None;
        changed
    }

    /// Dismiss the last-added notification, leaving the lines untouched.
    pub fn clear_last_added(&mut self) -> bool {
        self.last_added.take().is_some()
    }

    /// Apply `action`, returning whether the cart changed.
    pub fn apply(&mut self, action: CartAction) -> bool {
        match action {
            CartAction::Add(book) => {
                self.add(&book);
                true
            }
            CartAction::Remove(id) => self.remove(&id),
            CartAction::UpdateQuantity { id, delta } => self.update_quantity(&id, delta),
            CartAction::Clear => self.clear(),
            CartAction::ClearLastAdded => self.clear_last_added(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn book(id: &str, cents: u32) -> Book {
        Book {
            id: BookId::new(id),
            title: format!("Title {id}"),
            author: "Author".to_string(),
            price: Price::from_cents(cents),
            category: "Fiction".to_string(),
            stock: 10,
            image: None,
            description: None,
        }
    }

    #[test]
    fn test_distinct_adds_sum_prices_and_counts() {
        let mut cart = Cart::new();
        let books = [book("a", 1000), book("b", 250), book("c", 1999)];
        for b in &books {
            cart.add(b);
        }

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_cents(3249));
        let ids: Vec<_> = cart.lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_same_book_twice_merges_into_one_line() {
        let mut cart = Cart::new();
        let b = book("b1", 1000);
        cart.add(&b);
        cart.add(&b);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(&b.id).unwrap().quantity(), 2);
        assert_eq!(cart.last_added().unwrap().quantity(), 2);
    }

    #[test]
    fn test_last_added_superseded_by_next_add() {
        let mut cart = Cart::new();
        cart.add(&book("a", 100));
        cart.add(&book("b", 100));
        assert_eq!(cart.last_added().unwrap().id.as_str(), "b");
    }

    #[test]
    fn test_decrement_to_zero_removes_only_that_line() {
        let mut cart = Cart::new();
        cart.add(&book("a", 1000));
        cart.add(&book("b", 500));
        cart.add(&book("b", 500));

        assert!(cart.update_quantity(&BookId::new("a"), -1));

        assert!(cart.line(&BookId::new("a")).is_none());
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Price::from_cents(1000));
    }

    #[test]
    fn test_large_negative_delta_removes_line() {
        let mut cart = Cart::new();
        cart.add(&book("a", 1000));
        assert!(cart.update_quantity(&BookId::new("a"), -50));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(&book("a", 1000));
        let before = cart.clone();

        assert!(!cart.update_quantity(&BookId::new("missing"), 1));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_example() {
        let mut cart = Cart::new();
        cart.add(&book("b1", 1000));

        cart.update_quantity(&BookId::new("b1"), 2);

        assert_eq!(cart.line(&BookId::new("b1")).unwrap().quantity(), 3);
        assert_eq!(cart.total().to_string(), "$30.00");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_update_quantity_does_not_touch_last_added() {
        let mut cart = Cart::new();
        cart.add(&book("a", 100));
        cart.update_quantity(&BookId::new("a"), 4);
        assert_eq!(cart.last_added().unwrap().quantity(), 1);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&book("a", 100));
        assert!(!cart.remove(&BookId::new("zzz")));
        assert!(cart.remove(&BookId::new("a")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut cart = Cart::new();
        cart.add(&book("a", 100));
        cart.add(&book("b", 100));

        assert!(cart.clear());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.lines().is_empty());
        assert!(cart.last_added().is_none());
        assert!(!cart.clear());
    }

    #[test]
    fn test_clear_last_added_keeps_lines() {
        let mut cart = Cart::new();
        cart.add(&book("a", 100));
        assert!(cart.clear_last_added());
        assert!(cart.last_added().is_none());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_apply_actions() {
        let mut cart = Cart::new();
        let actions = [
            CartAction::Add(book("a", 400)),
            CartAction::Add(book("a", 400)),
            CartAction::Add(book("b", 100)),
            CartAction::UpdateQuantity {
                id: BookId::new("b"),
                delta: -1,
            },
            CartAction::ClearLastAdded,
        ];
        for action in actions {
            assert!(cart.apply(action));
        }

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Price::from_cents(800));
        assert!(!cart.apply(CartAction::Remove(BookId::new("b"))));
    }

    #[test]
    fn test_total_saturates_for_huge_amounts() {
        let mut pricey = book("rare", 0);
        pricey.price = Price::new(rust_decimal::Decimal::from_i128_with_scale(
            4 * 10_i128.pow(28),
            0,
        ))
        .unwrap();

        let mut cart = Cart::new();
        cart.add(&pricey);
        cart.add(&pricey);
        cart.add(&book("a", 1000));
        assert_eq!(cart.total().amount(), rust_decimal::Decimal::MAX);

        assert!(cart.update_quantity(&BookId::new("rare"), i64::MAX));
        assert_eq!(cart.line(&BookId::new("rare")).unwrap().quantity(), u32::MAX);
        assert_eq!(cart.total().amount(), rust_decimal::Decimal::MAX);
        assert_eq!(cart.item_count(), u64::from(u32::MAX) + 1);
    }
}
