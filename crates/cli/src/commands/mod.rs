//! Command implementations.
//!
//! Every command runs against an [`App`], which wires the API client to a
//! file-backed credential store so the session survives between runs.

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod users;

use std::path::PathBuf;
use std::sync::Arc;

use bookstore_core::User;
use bookstore_storefront::checkout::CheckoutError;
use bookstore_storefront::credentials::{CredentialError, FileCredentialStore};
use bookstore_storefront::loading::LoadingPhase;
use bookstore_storefront::navigation::MemoryNavigator;
use bookstore_storefront::services::{
    AuthError, AuthService, CatalogService, OrderService, UserService,
};
use bookstore_storefront::{ApiClient, ApiError, ClientConfig};
use thiserror::Error;
use tokio::task::AbortHandle;

/// Session file used when `BOOKSTORE_CREDENTIALS_FILE` is unset.
const DEFAULT_CREDENTIALS_FILE: &str = ".bookstore-credentials.json";

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Not logged in. Run `bookstore login` first.")]
    NotLoggedIn,

    #[error("This command requires an admin account")]
    NotAdmin,

    #[error("Book {0} is out of stock")]
    OutOfStock(String),

    #[error("No books given; pass --book <id> at least once")]
    NoBooks,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{}", .0.user_message())]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// Services shared by all commands.
pub struct App {
    pub client: ApiClient,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub users: UserService,
}

impl App {
    /// Build the client with a file-backed session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CliError> {
        let credentials_file = config
            .credentials_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE));
        tracing::debug!(path = %credentials_file.display(), "Using credentials file");

        let client = ApiClient::new(
            config,
            Arc::new(FileCredentialStore::new(credentials_file)),
            Arc::new(MemoryNavigator::default()),
        )?;

        let catalog = CatalogService::new(client.clone());
        Ok(Self {
            auth: AuthService::new(client.clone()),
            orders: OrderService::new(client.clone()).with_catalog(catalog.clone()),
            catalog,
            users: UserService::new(client.clone()),
            client,
        })
    }

    /// The logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotLoggedIn` if there is no stored session.
    pub fn require_user(&self) -> Result<User, CliError> {
        self.auth.current_user()?.ok_or(CliError::NotLoggedIn)
    }

    /// The logged-in user, who must be an admin.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotAdmin` for non-admin sessions.
    pub fn require_admin(&self) -> Result<User, CliError> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(CliError::NotAdmin)
        }
    }

    /// Log a notice while requests are slow (the API may be cold-starting).
    ///
    /// The notice stops when the returned handle is dropped.
    #[must_use]
    pub fn show_slow_loading(&self) -> LoadingNotice {
        let mut phase = self.client.loading_phase();
        let task = tokio::spawn(async move {
            while phase.changed().await.is_ok() {
                let current = *phase.borrow_and_update();
                if current == LoadingPhase::Slow
                    && let Some(message) = current.message()
                {
                    tracing::info!("{message}");
                }
            }
        });
        LoadingNotice {
            task: task.abort_handle(),
        }
    }
}

/// Handle for [`App::show_slow_loading`].
pub struct LoadingNotice {
    task: AbortHandle,
}

impl Drop for LoadingNotice {
    fn drop(&mut self) {
        self.task.abort();
    }
}
