//! Authentication service.
//!
//! Logs in or signs up against the API and keeps the returned token and
//! profile in the client's credential store.

mod error;

pub use error::AuthError;

use bookstore_core::{AuthResponse, Email, LoginRequest, SignupRequest, User};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use crate::client::ApiClient;

/// Authentication service.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // =========================================================================
    // Login / Signup
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if a field is blank,
    /// `AuthError::InvalidEmail` if the email is malformed, and
    /// `AuthError::Api` if the API rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: SecretString) -> Result<User, AuthError> {
        let request = LoginRequest {
            email: required_email(email)?,
            password: required_secret(password)?,
        };
        let response: AuthResponse = self.client.post("/auth/login", &request).await?;
        self.store(response)
    }

    /// Create an account and log in as it.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login); `name` is also required.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        email: &str,
        password: SecretString,
        name: &str,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        let request = SignupRequest {
            email: required_email(email)?,
            password: required_secret(password)?,
            name: name.to_string(),
        };
        let response: AuthResponse = self.client.post("/auth/signup", &request).await?;
        self.store(response)
    }

    fn store(&self, response: AuthResponse) -> Result<User, AuthError> {
        self.client.session().save_response(&response)?;
        info!(user_id = %response.user.id, "Logged in");
        Ok(response.user)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Clear the session and return to the login view.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be written.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.client.session().clear()?;
        let navigator = self.client.navigator();
        navigator.navigate_replacing(&self.client.config().login_path);
        navigator.notify_location_changed();
        info!("Logged out");
        Ok(())
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be read.
    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.client.session().user()?)
    }

    /// # Errors
    ///
    /// Returns an error if the credential store cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.client.session().is_authenticated()?)
    }

    /// Whether the logged-in user has the admin role.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be read.
    pub fn is_admin(&self) -> Result<bool, AuthError> {
        Ok(self.current_user()?.is_some_and(|u| u.is_admin()))
    }

    /// The stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be read.
    pub fn token(&self) -> Result<Option<SecretString>, AuthError> {
        Ok(self.client.session().token()?)
    }
}

fn required_email(email: &str) -> Result<Email, AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::MissingField("email"));
    }
    Ok(Email::parse(email)?)
}

fn required_secret(password: SecretString) -> Result<SecretString, AuthError> {
    if password.expose_secret().is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    Ok(password)
}
