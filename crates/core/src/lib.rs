//! Bookstore Core - Shared types library.
//!
//! This crate provides the types used across all bookstore components:
//! - `storefront` - Client library (HTTP facade, cart store, services)
//! - `cli` - Command-line client built on the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and API payloads
//! - [`cart`] - The shopping cart reducer and its derived totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartAction, CartLine};
pub use types::*;
