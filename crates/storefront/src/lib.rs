//! Bookstore storefront client library.
//!
//! Everything a storefront front end needs besides rendering:
//!
//! - [`client::ApiClient`] - HTTP facade that attaches the bearer token,
//!   tracks in-flight requests for the loading indicator and performs a
//!   one-shot forced logout when the API answers 401
//! - [`cart::CartStore`] - observable shopping cart
//! - [`services`] - auth, catalog, orders and users
//! - [`checkout`] - order form validation and submission
//! - [`credentials`] and [`navigation`] - the persistence and routing seams
//!   the client depends on

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod loading;
pub mod logout;
pub mod navigation;
pub mod services;
pub mod telemetry;

pub use cart::CartStore;
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
