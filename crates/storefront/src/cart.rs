//! Observable shopping cart.
//!
//! [`CartStore`] wraps the [`Cart`] reducer in a `watch` channel: every
//! mutation that changes the cart commits a new state and wakes subscribers.
//! Mutations that leave the cart untouched (unknown ids, clearing an empty
//! cart) notify nobody.

use std::sync::Arc;

use bookstore_core::{Book, BookId, Cart, CartAction, CartLine, Price};
use tokio::sync::watch;
use tracing::debug;

/// Shared, observable cart. Clones share the same cart.
#[derive(Debug, Clone)]
pub struct CartStore {
    state: Arc<watch::Sender<Cart>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(Cart::new());
        Self {
            state: Arc::new(state),
        }
    }

    /// Apply `action`. Returns whether the cart changed.
    pub fn dispatch(&self, action: CartAction) -> bool {
        let label = action_label(&action);
        let changed = self.state.send_if_modified(|cart| cart.apply(action));
        if changed {
            let cart = self.state.borrow();
            debug!(
                action = label,
                lines = cart.lines().len(),
                item_count = cart.item_count(),
                "Cart updated"
            );
        }
        changed
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn add_to_cart(&self, book: &Book) {
        self.dispatch(CartAction::Add(book.clone()));
    }

    pub fn remove_from_cart(&self, id: &BookId) {
        self.dispatch(CartAction::Remove(id.clone()));
    }

    /// Change a line's quantity by `delta`; dropping to zero or below removes
    /// the line.
    pub fn update_quantity(&self, id: &BookId, delta: i64) {
        self.dispatch(CartAction::UpdateQuantity {
            id: id.clone(),
            delta,
        });
    }

    pub fn clear_cart(&self) {
        self.dispatch(CartAction::Clear);
    }

    /// Dismiss the "added to cart" notification.
    pub fn clear_last_added(&self) {
        self.dispatch(CartAction::ClearLastAdded);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.state.borrow().lines().to_vec()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.state.borrow().total()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state.borrow().item_count()
    }

    #[must_use]
    pub fn last_added(&self) -> Option<CartLine> {
        self.state.borrow().last_added().cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    /// Observe every committed cart state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }
}

const fn action_label(action: &CartAction) -> &'static str {
    match action {
        CartAction::Add(_) => "add",
        CartAction::Remove(_) => "remove",
        CartAction::UpdateQuantity { .. } => "update_quantity",
        CartAction::Clear => "clear",
        CartAction::ClearLastAdded => "clear_last_added",
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
            stock: 3,
            image: None,
            description: None,
        }
    }

    #[test]
    fn test_add_and_read_back() {
        let store = CartStore::new();
        store.add_to_cart(&book("b1", 1000));
        store.add_to_cart(&book("b2", 250));
        store.add_to_cart(&book("b1", 1000));

        let items = store.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity(), 2);
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.total(), Price::from_cents(2250));
        assert_eq!(store.last_added().unwrap().quantity(), 2);
    }

    #[test]
    fn test_update_quantity_example() {
        let store = CartStore::new();
        store.add_to_cart(&book("b1", 1000));
        store.update_quantity(&BookId::new("b1"), 2);

        assert_eq!(store.items()[0].quantity(), 3);
        assert_eq!(store.total().to_string(), "$30.00");
        assert_eq!(store.item_count(), 3);
    }

    #[test]
    fn test_subscribers_see_changes_only() {
        let store = CartStore::new();
        let mut rx = store.subscribe();

        store.update_quantity(&BookId::new("missing"), 1);
        assert!(!rx.has_changed().unwrap());

        store.add_to_cart(&book("b1", 500));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().item_count(), 1);

        store.remove_from_cart(&BookId::new("nope"));
        assert!(!rx.has_changed().unwrap());

        store.clear_cart();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = CartStore::new();
        let other = store.clone();
        other.add_to_cart(&book("b1", 100));
        assert!(!store.is_empty());

        store.clear_last_added();
        assert!(other.last_added().is_none());
        assert_eq!(other.item_count(), 1);
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let store = CartStore::new();
        store.add_to_cart(&book("b1", 100));
        store.update_quantity(&BookId::new("b1"), -1);
        assert!(store.is_empty());
        assert_eq!(store.total(), Price::ZERO);
    }
}
