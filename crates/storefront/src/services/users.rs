//! User administration.

use bookstore_core::{User, UserId};
use tracing::{info, instrument};

use crate::client::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>> {
        self.client.get("/users").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &UserId) -> Result<()> {
        self.client
            .delete(&format!("/users/{}", urlencoding::encode(id.as_str())))
            .await?;
        info!("User deleted");
        Ok(())
    }
}
