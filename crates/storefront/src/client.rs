//! HTTP client facade for the bookstore API.
//!
//! Every outbound call goes through [`ApiClient`], which applies the same
//! bookkeeping around each request:
//!
//! 1. Attach `Authorization: Bearer <token>` when the credential store has a
//!    token.
//! 2. Count the request as in flight for the whole call (see
//!    [`LoadingTracker`]); the count is settled exactly once, even when the
//!    request fails before sending or the future is dropped.
//! 3. On HTTP 401, run the forced-logout sequence at most once per cooldown
//!    window: clear the credential pair and redirect to the login view.
//! 4. Return the original result. Errors are never swallowed or retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bookstore_storefront::client::ApiClient;
//! use bookstore_storefront::credentials::MemoryCredentialStore;
//! use bookstore_storefront::navigation::MemoryNavigator;
//!
//! let client = ApiClient::new(
//!     config,
//!     Arc::new(MemoryCredentialStore::new()),
//!     Arc::new(MemoryNavigator::default()),
//! )?;
//!
//! let _sub = client.subscribe_to_loading(|loading| show_spinner(loading));
//! let books: Vec<Book> = client.get("/books").await?;
//! ```

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::credentials::{CredentialSession, CredentialStore};
use crate::error::{ApiError, Result};
use crate::loading::{LoadingPhase, LoadingSubscription, LoadingTracker};
use crate::logout::LogoutLatch;
use crate::navigation::Navigator;

/// Shared client for the bookstore API.
///
/// Cheap to clone; clones share the HTTP connection pool, the request
/// ledger (pending count and logout latch) and the credential store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    session: CredentialSession,
    navigator: Arc<dyn Navigator>,
    loading: LoadingTracker,
    logout: LogoutLatch,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("pending_requests", &self.inner.loading.pending())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client with a fresh request ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Network)?;
        let logout = LogoutLatch::new(config.logout_cooldown);

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                config,
                session: CredentialSession::new(store),
                navigator,
                loading: LoadingTracker::new(),
                logout,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The token + user record this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &CredentialSession {
        &self.inner.session
    }

    /// The navigation bridge used for forced logout.
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    // =========================================================================
    // Loading signals
    // =========================================================================

    #[must_use]
    pub fn loading(&self) -> &LoadingTracker {
        &self.inner.loading
    }

    /// Whether any request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.is_loading()
    }

    /// Number of requests in flight.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.inner.loading.pending()
    }

    /// Call `callback` whenever the loading signal flips.
    ///
    /// See [`LoadingTracker::subscribe_to_loading`].
    pub fn subscribe_to_loading<F>(&self, callback: F) -> LoadingSubscription
    where
        F: Fn(bool) + Send + 'static,
    {
        self.inner.loading.subscribe_to_loading(callback)
    }

    /// Loading phase using the configured slow threshold.
    #[must_use]
    pub fn loading_phase(&self) -> watch::Receiver<LoadingPhase> {
        self.inner.loading.phase(self.inner.config.slow_threshold)
    }

    /// Whether a forced logout happened within the current cooldown window.
    #[must_use]
    pub fn is_handling_logout(&self) -> bool {
        self.inner.logout.is_held()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Send a request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures, non-success statuses,
    /// or a body that does not decode as `T`.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.send(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to decode API response"
            );
            ApiError::Decode(e)
        })
    }

    /// Send a request whose response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures or non-success statuses.
    pub async fn request_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body).await.map(drop)
    }

    /// `GET` and decode.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// `POST` a JSON body and decode.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// `PUT` a JSON body and decode.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// `PUT` without a body, ignoring the response body.
    ///
    /// # Errors
    ///
    /// See [`request_empty`](Self::request_empty).
    pub async fn put_empty(&self, path: &str) -> Result<()> {
        self.request_empty(Method::PUT, path, None::<&()>).await
    }

    /// `DELETE`, ignoring the response body.
    ///
    /// # Errors
    ///
    /// See [`request_empty`](Self::request_empty).
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request_empty(Method::DELETE, path, None::<&()>).await
    }

    /// Join a request path onto the base URL, keeping any base path prefix.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.inner.config.api_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Run one request through the interceptor bookkeeping and return the
    /// raw response body of a successful call.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let in_flight = self.inner.loading.begin();
        let outcome = self.dispatch(method, path, body).await;
        drop(in_flight);

        if let Err(err) = &outcome {
            if err.is_unauthorized() {
                self.force_logout();
            } else if err.status().is_some_and(|s| s.is_server_error()) {
                tracing::error!(error = %err, "API request failed");
            } else {
                debug!(error = %err, "API request failed");
            }
        }
        outcome
    }

    async fn dispatch<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let timeout = self.inner.config.request_timeout;

        let mut request = self
            .inner
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(token) = self.inner.session.token()? {
            request = request.bearer_auth(token.expose_secret());
        }

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(ApiError::Encode)?;
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(e, timeout))?;

        if !status.is_success() {
            return Err(ApiError::from_response(status, &text));
        }

        debug!(status = %status, "API request succeeded");
        Ok(text)
    }

    /// Clear credentials and redirect to the login view, unless another
    /// request already did so within the cooldown window.
    fn force_logout(&self) {
        if !self.inner.logout.try_acquire() {
            debug!("Forced logout already handled in this window");
            return;
        }

        tracing::warn!("Received 401, clearing credentials");
        if let Err(e) = self.inner.session.clear() {
            tracing::error!(error = %e, "Failed to clear credentials during forced logout");
        }

        let login_path = &self.inner.config.login_path;
        if self.inner.navigator.current_path() != *login_path {
            self.inner.navigator.navigate_replacing(login_path);
            self.inner.navigator.notify_location_changed();
        }
    }
}
