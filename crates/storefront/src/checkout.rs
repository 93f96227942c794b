//! Checkout: turn the cart and a delivery form into a placed order.
//!
//! The form is validated locally before anything is sent. The cart is only
//! cleared once the API has accepted the order; a rejected order leaves it
//! intact so the user can fix the problem and retry.

use bookstore_core::{Cart, CreateOrder, Order, OrderItem, PaymentInfo, User};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, instrument};

use crate::cart::CartStore;
use crate::client::ApiClient;
use crate::credentials::{CredentialError, CredentialSession};
use crate::error::ApiError;
use crate::services::{CatalogService, OrderService};

/// Delivery section of the checkout form.
#[derive(Debug, Clone, Default)]
pub struct DeliveryDetails {
    pub full_name: String,
    pub email: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl DeliveryDetails {
    fn is_complete(&self) -> bool {
        [
            &self.full_name,
            &self.email,
            &self.address_line1,
            &self.city,
            &self.state,
            &self.postal_code,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// The postal address as newline-separated lines.
    ///
    /// The last line is `"{city}, {state} {postal_code}"`; a blank second
    /// address line is dropped.
    #[must_use]
    pub fn formatted_address(&self) -> String {
        let locality = format!(
            "{}, {} {}",
            self.city.trim(),
            self.state.trim(),
            self.postal_code.trim()
        );
        [self.address_line1.trim(), self.address_line2.trim(), &locality]
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Card fields as entered. Passed through to the API untouched.
#[derive(Debug)]
pub struct CardDetails {
    pub card_number: SecretString,
    pub card_name: String,
    pub expiry: String,
    pub cvv: SecretString,
}

impl CardDetails {
    fn is_complete(&self) -> bool {
        !self.card_number.expose_secret().trim().is_empty()
            && !self.card_name.trim().is_empty()
            && !self.expiry.trim().is_empty()
            && !self.cvv.expose_secret().trim().is_empty()
    }
}

#[derive(Debug, Default)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card(CardDetails),
}

/// Reasons an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Please complete the delivery address.")]
    IncompleteAddress,

    #[error("Please provide card details.")]
    MissingCardDetails,

    #[error("You must be logged in to place an order.")]
    NotLoggedIn,

    #[error("Could not read the current session: {0}")]
    Session(#[from] CredentialError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Message to show under the form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.message_or("Order failed."),
            other => other.to_string(),
        }
    }
}

/// Validate the form and build the order request.
///
/// Checks run in form order: cart, delivery address, card details, then the
/// logged-in user.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn build_order(
    cart: &Cart,
    user: Option<&User>,
    delivery: &DeliveryDetails,
    payment: PaymentMethod,
) -> Result<CreateOrder, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if !delivery.is_complete() {
        return Err(CheckoutError::IncompleteAddress);
    }
    if let PaymentMethod::Card(card) = &payment
        && !card.is_complete()
    {
        return Err(CheckoutError::MissingCardDetails);
    }
    let user = user.ok_or(CheckoutError::NotLoggedIn)?;

    let address = delivery.formatted_address();
    let payment_info = match payment {
        PaymentMethod::Cash => None,
        PaymentMethod::Card(card) => Some(PaymentInfo {
            card_number: card.card_number,
            card_name: card.card_name,
            expiry: card.expiry,
            cvv: card.cvv,
            address: address.clone(),
        }),
    };

    Ok(CreateOrder {
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        items: cart.lines().iter().map(OrderItem::from).collect(),
        shipping_address: Some(address),
        payment_info,
    })
}

/// Places orders for the shared cart.
#[derive(Debug, Clone)]
pub struct Checkout {
    cart: CartStore,
    orders: OrderService,
    session: CredentialSession,
}

impl Checkout {
    #[must_use]
    pub fn new(client: ApiClient, cart: CartStore) -> Self {
        Self {
            cart,
            session: client.session().clone(),
            orders: OrderService::new(client),
        }
    }

    /// Refresh `catalog`'s cached stock once an order is placed.
    #[must_use]
    pub fn with_catalog(mut self, catalog: CatalogService) -> Self {
        self.orders = self.orders.with_catalog(catalog);
        self
    }

    /// Validate, submit, and on success empty the cart.
    ///
    /// # Errors
    ///
    /// Returns a validation error without contacting the API, or the API's
    /// rejection with the cart left as it was.
    #[instrument(skip_all)]
    pub async fn place_order(
        &self,
        delivery: &DeliveryDetails,
        payment: PaymentMethod,
    ) -> Result<Order, CheckoutError> {
        let user = self.session.user()?;
        let request = build_order(&self.cart.snapshot(), user.as_ref(), delivery, payment)?;

        let order = self.orders.create(&request).await?;
        self.cart.clear_cart();
        info!(order_id = %order.id, "Checkout complete");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookstore_core::{Book, BookId, Price, UserId, UserRole};

    use super::*;

    fn book(id: &str, cents: u32) -> Book {
        Book {
            id: BookId::new(id),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            price: Price::from_cents(cents),
            category: "Sci-Fi".to_string(),
            stock: 10,
            image: None,
            description: None,
        }
    }

    fn user() -> User {
        User {
            id: UserId::new("u1"),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Unspecified,
        }
    }

    fn delivery() -> DeliveryDetails {
        DeliveryDetails {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            address_line1: "12 St James's Square".to_string(),
            address_line2: String::new(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            postal_code: "SW1Y 4JH".to_string(),
        }
    }

    fn card(number: &str) -> PaymentMethod {
        PaymentMethod::Card(CardDetails {
            card_number: SecretString::from(number),
            card_name: "A Lovelace".to_string(),
            expiry: "12/30".to_string(),
            cvv: SecretString::from("123"),
        })
    }

    fn cart_with(books: &[Book]) -> Cart {
        let mut cart = Cart::new();
        for b in books {
            cart.add(b);
        }
        cart
    }

    #[test]
    fn test_formatted_address_drops_blank_lines() {
        assert_eq!(
            delivery().formatted_address(),
            "12 St James's Square\nLondon, LDN SW1Y 4JH"
        );

        let mut with_flat = delivery();
        with_flat.address_line2 = "Flat 2".to_string();
        assert_eq!(
            with_flat.formatted_address(),
            "12 St James's Square\nFlat 2\nLondon, LDN SW1Y 4JH"
        );
    }

    #[test]
    fn test_validation_order() {
        let empty = Cart::new();
        let err = build_order(&empty, None, &DeliveryDetails::default(), PaymentMethod::Cash)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        let cart = cart_with(&[book("b1", 1000)]);
        let mut incomplete = delivery();
        incomplete.city = "  ".to_string();
        let err = build_order(&cart, None, &incomplete, PaymentMethod::Cash).unwrap_err();
        assert_eq!(err.user_message(), "Please complete the delivery address.");

        let mut no_email = delivery();
        no_email.email = String::new();
        let err = build_order(&cart, None, &no_email, PaymentMethod::Cash).unwrap_err();
        assert!(matches!(err, CheckoutError::IncompleteAddress));

        // the form only asks for a contact address, it does not vet it
        let mut loose_email = delivery();
        loose_email.email = "ada at example".to_string();
        let order = build_order(&cart, Some(&user()), &loose_email, PaymentMethod::Cash).unwrap();
        assert_eq!(order.user_name, "Ada");

        let err = build_order(&cart, None, &delivery(), card("")).unwrap_err();
        assert!(matches!(err, CheckoutError::MissingCardDetails));

        let err = build_order(&cart, None, &delivery(), PaymentMethod::Cash).unwrap_err();
        assert!(matches!(err, CheckoutError::NotLoggedIn));
    }

    #[test]
    fn test_cash_order_has_no_payment_info() {
        let cart = cart_with(&[book("b1", 1000), book("b1", 1000), book("b2", 550)]);
        let order = build_order(&cart, Some(&user()), &delivery(), PaymentMethod::Cash).unwrap();

        assert_eq!(order.user_name, "Ada");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.total(), Price::from_cents(2550));
        assert!(order.payment_info.is_none());
        assert_eq!(
            order.shipping_address.as_deref(),
            Some("12 St James's Square\nLondon, LDN SW1Y 4JH")
        );
    }

    #[test]
    fn test_card_order_carries_billing_address() {
        let cart = cart_with(&[book("b1", 1000)]);
        let order =
            build_order(&cart, Some(&user()), &delivery(), card("4111111111111111")).unwrap();

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["paymentInfo"]["cardNumber"], "4111111111111111");
        assert_eq!(json["paymentInfo"]["address"], json["shippingAddress"]);
        assert!(!format!("{order:?}").contains("4111111111111111"));
    }
}
