//! Core types for the bookstore.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! JSON payloads exchanged with the bookstore API.

pub mod catalog;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
mod secret;
pub mod status;
pub mod user;

pub use catalog::{Book, BookInput, Genre, GenreInput};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{CreateOrder, Order, OrderItem, PaymentInfo};
pub use price::{Price, PriceError};
pub use status::*;
pub use user::{AuthResponse, LoginRequest, SignupRequest, User};
