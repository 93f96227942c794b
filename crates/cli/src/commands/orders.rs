//! Order commands.

use bookstore_core::{BookId, Order, OrderId, OrderStatus};
use bookstore_storefront::CartStore;
use bookstore_storefront::checkout::{CardDetails, Checkout, DeliveryDetails, PaymentMethod};
use bookstore_storefront::services::{count_by_status, filter_by_status};
use clap::Args;
use secrecy::SecretString;

use super::{App, CliError};

/// Arguments for `orders place`.
#[derive(Args)]
pub struct PlaceArgs {
    /// Book to order; repeat to order several copies or titles
    #[arg(short, long = "book", required = true)]
    books: Vec<String>,

    /// Recipient's full name
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    /// Address line 1
    #[arg(long)]
    address: String,

    /// Address line 2
    #[arg(long, default_value = "")]
    address2: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    /// Postal code
    #[arg(long)]
    postal: String,

    /// Pay by card instead of cash on delivery
    #[arg(long, requires_all = ["card_name", "expiry", "cvv"])]
    card_number: Option<String>,

    /// Name on the card
    #[arg(long)]
    card_name: Option<String>,

    /// Card expiry (MM/YY)
    #[arg(long)]
    expiry: Option<String>,

    #[arg(long)]
    cvv: Option<String>,
}

impl PlaceArgs {
    fn delivery(&self) -> DeliveryDetails {
        DeliveryDetails {
            full_name: self.name.clone(),
            email: self.email.clone(),
            address_line1: self.address.clone(),
            address_line2: self.address2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal.clone(),
        }
    }

    fn payment(&mut self) -> PaymentMethod {
        match self.card_number.take() {
            None => PaymentMethod::Cash,
            Some(number) => PaymentMethod::Card(CardDetails {
                card_number: SecretString::from(number),
                card_name: self.card_name.take().unwrap_or_default(),
                expiry: self.expiry.take().unwrap_or_default(),
                cvv: SecretString::from(self.cvv.take().unwrap_or_default()),
            }),
        }
    }
}

#[allow(clippy::print_stdout)]
pub async fn list(app: &App, status: Option<&str>, all: bool) -> Result<(), CliError> {
    let orders = if all {
        app.require_admin()?;
        app.orders.list_all().await?
    } else {
        let user = app.require_user()?;
        app.orders.list_for_user(&user.id).await?
    };

    let status = status.map(OrderStatus::parse);
    let shown = filter_by_status(&orders, status.as_ref());
    if shown.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    for order in shown {
        print_order(order, all);
    }

    println!();
    let summary: Vec<String> = [
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Closed,
        OrderStatus::Cancelled,
    ]
    .iter()
    .map(|s| format!("{s}: {}", count_by_status(&orders, s)))
    .collect();
    println!("{} orders ({})", orders.len(), summary.join(", "));
    Ok(())
}

pub async fn cancel(app: &App, id: &str) -> Result<(), CliError> {
    app.require_user()?;
    app.orders.cancel(&OrderId::new(id)).await?;
    tracing::info!("Order {id} cancelled");
    Ok(())
}

pub async fn complete(app: &App, id: &str) -> Result<(), CliError> {
    app.require_admin()?;
    app.orders.complete(&OrderId::new(id)).await?;
    tracing::info!("Order {id} marked as completed");
    Ok(())
}

pub async fn close(app: &App, id: &str) -> Result<(), CliError> {
    app.require_admin()?;
    app.orders.close(&OrderId::new(id)).await?;
    tracing::info!("Order {id} closed");
    Ok(())
}

/// Fill a cart with the requested books and check it out.
#[allow(clippy::print_stdout)]
pub async fn place(app: &App, mut args: PlaceArgs) -> Result<(), CliError> {
    if args.books.is_empty() {
        return Err(CliError::NoBooks);
    }

    let cart = CartStore::new();
    for id in &args.books {
        let book = app.catalog.book(&BookId::new(id.as_str())).await?;
        if !book.in_stock() {
            return Err(CliError::OutOfStock(book.title));
        }
        cart.add_to_cart(&book);
    }

    for line in cart.items() {
        println!(
            "{} x {} by {}  {}",
            line.quantity(),
            line.title,
            line.author,
            line.line_total()
        );
    }
    println!("Total: {} ({} items)", cart.total(), cart.item_count());

    let delivery = args.delivery();
    let payment = args.payment();
    let order = Checkout::new(app.client.clone(), cart)
        .with_catalog(app.catalog.clone())
        .place_order(&delivery, payment)
        .await?;

    println!("Order {} placed ({})", order.id, order.status);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order, with_customer: bool) {
    let when = order.date.format("%Y-%m-%d %H:%M");
    if with_customer {
        println!(
            "{}  {when}  {:<10} {:>9}  {}",
            order.id,
            order.status.as_str(),
            order.total.to_string(),
            order.user_name
        );
    } else {
        println!(
            "{}  {when}  {:<10} {:>9}",
            order.id,
            order.status.as_str(),
            order.total.to_string()
        );
    }
    for item in &order.items {
        println!("    {} x {} by {}", item.quantity, item.title, item.author);
    }
}
