//! Order service: history, placement and status transitions.

use bookstore_core::{CreateOrder, Order, OrderId, OrderStatus, UserId};
use tracing::{info, instrument};

use super::CatalogService;
use crate::client::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct OrderService {
    client: ApiClient,
    catalog: Option<CatalogService>,
}

impl OrderService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            catalog: None,
        }
    }

    /// Drop `catalog`'s cached books whenever an order moves stock
    /// (placement and cancellation).
    #[must_use]
    pub fn with_catalog(mut self, catalog: CatalogService) -> Self {
        self.catalog = Some(catalog);
        self
    }

    async fn stock_changed(&self) {
        if let Some(catalog) = &self.catalog {
            catalog.invalidate_all().await;
        }
    }

    /// All orders (admin view).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        self.client.get("/orders").await
    }

    /// Orders placed by one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        self.client
            .get(&format!(
                "/orders/user/{}",
                urlencoding::encode(user_id.as_str())
            ))
            .await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order (e.g. insufficient
    /// stock).
    #[instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len()))]
    pub async fn create(&self, order: &CreateOrder) -> Result<Order> {
        let placed: Order = self.client.post("/orders", order).await?;
        self.stock_changed().await;
        info!(order_id = %placed.id, total = %placed.total, "Order placed");
        Ok(placed)
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the transition.
    pub async fn cancel(&self, id: &OrderId) -> Result<()> {
        self.transition(id, "cancel").await?;
        self.stock_changed().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the transition.
    pub async fn complete(&self, id: &OrderId) -> Result<()> {
        self.transition(id, "complete").await
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the transition.
    pub async fn close(&self, id: &OrderId) -> Result<()> {
        self.transition(id, "close").await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn transition(&self, id: &OrderId, action: &str) -> Result<()> {
        self.client
            .put_empty(&format!(
                "/orders/{}/{action}",
                urlencoding::encode(id.as_str())
            ))
            .await?;
        info!("Order status changed");
        Ok(())
    }
}

/// Orders matching `status`, or all orders when `status` is `None`.
#[must_use]
pub fn filter_by_status<'a>(orders: &'a [Order], status: Option<&OrderStatus>) -> Vec<&'a Order> {
    orders
        .iter()
        .filter(|o| status.is_none_or(|s| &o.status == s))
        .collect()
}

/// Number of orders in `status`.
#[must_use]
pub fn count_by_status(orders: &[Order], status: &OrderStatus) -> usize {
    orders.iter().filter(|o| &o.status == status).count()
}
