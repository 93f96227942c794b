//! Order payloads.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{BookId, OrderId, OrderStatus, Price, UserId};
use crate::cart::CartLine;

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            title: line.title.clone(),
            author: line.author.clone(),
            price: line.price,
            quantity: line.quantity(),
        }
    }
}

/// An order as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: String,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_provider_id: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
}

/// Card details forwarded with an order.
///
/// The client does no payment processing; the fields travel to the API
/// as entered. Card number and CVV are kept out of `Debug` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    #[serde(serialize_with = "super::secret::serialize")]
    pub card_number: SecretString,
    pub card_name: String,
    pub expiry: String,
    #[serde(serialize_with = "super::secret::serialize")]
    pub cvv: SecretString,
    /// Billing address, formatted like the shipping address.
    pub address: String,
}

/// Request body for placing an order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub user_id: UserId,
    pub user_name: String,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<PaymentInfo>,
}

impl CreateOrder {
    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}
