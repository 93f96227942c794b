//! Shared harness for the bookstore client integration tests.
//!
//! Each [`TestContext`] starts its own mock API server and a client wired to
//! in-memory credential and navigation stores, so tests can run in parallel
//! and inspect every side effect.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookstore-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use bookstore_core::{User, UserId, UserRole};
use bookstore_storefront::credentials::MemoryCredentialStore;
use bookstore_storefront::navigation::MemoryNavigator;
use bookstore_storefront::{ApiClient, ClientConfig};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::MockServer;

/// Token stored by [`TestContext::sign_in`].
pub const TEST_TOKEN: &str = "test-token";

/// A mock API server plus a client pointed at it.
pub struct TestContext {
    pub server: MockServer,
    pub client: ApiClient,
    pub store: Arc<MemoryCredentialStore>,
    pub navigator: Arc<MemoryNavigator>,
}

impl TestContext {
    /// Context with default client settings, starting on `/orders`.
    pub async fn new() -> Self {
        Self::with_config(|config| config).await
    }

    /// Context whose client config is adjusted by `configure`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub async fn with_config(configure: impl FnOnce(ClientConfig) -> ClientConfig) -> Self {
        let server = MockServer::start().await;
        let api_url = Url::parse(&format!("{}/api", server.uri())).expect("mock server URI");
        let config = configure(
            ClientConfig::new(api_url)
                .with_request_timeout(Duration::from_secs(5))
                .with_logout_cooldown(Duration::from_millis(300)),
        );

        let store = Arc::new(MemoryCredentialStore::new());
        let navigator = Arc::new(MemoryNavigator::new("/orders"));
        let client = ApiClient::new(
            config,
            store.clone(),
            navigator.clone(),
        )
        .expect("client builds");

        Self {
            server,
            client,
            store,
            navigator,
        }
    }

    /// Store a session for a user with `role`.
    ///
    /// # Panics
    ///
    /// Panics if the credential store rejects the write.
    pub fn sign_in(&self, role: UserRole) -> User {
        let user = test_user(role);
        self.client
            .session()
            .save(&SecretString::from(TEST_TOKEN), &user)
            .expect("session saved");
        user
    }
}

/// The user every fixture belongs to.
#[must_use]
pub fn test_user(role: UserRole) -> User {
    User {
        id: UserId::new("u1"),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        role,
    }
}

/// JSON for a book as the API returns it.
#[must_use]
pub fn book_json(id: &str, title: &str, price: f64, stock: u32) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "Test Author",
        "price": price,
        "category": "Fiction",
        "stock": stock,
        "image": format!("https://img.example.com/{id}.jpg")
    })
}

/// JSON for a login/signup response.
#[must_use]
pub fn auth_json(role: &str) -> Value {
    json!({
        "token": TEST_TOKEN,
        "user": {"id": "u1", "name": "Ada Lovelace", "email": "ada@example.com", "role": role}
    })
}

/// JSON for a placed order.
#[must_use]
pub fn order_json(id: &str, status: &str, items: &Value, total: f64) -> Value {
    json!({
        "id": id,
        "userId": "u1",
        "userName": "Ada Lovelace",
        "items": items,
        "total": total,
        "date": "2025-06-01T10:00:00Z",
        "status": status
    })
}
