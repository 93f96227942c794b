//! Service wrappers over the API client.
//!
//! # Services
//!
//! - `auth` - Login, signup, logout and the cached session
//! - `catalog` - Books and genres (cached for 5 minutes)
//! - `orders` - Order history, placement and status changes
//! - `users` - User administration

pub mod auth;
mod cache;
pub mod catalog;
pub mod orders;
pub mod users;

pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
pub use orders::{OrderService, count_by_status, filter_by_status};
pub use users::UserService;
