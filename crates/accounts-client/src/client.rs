//! HTTP client for the accounts API.

use crate::error::Error;
use crate::types::*;
use reqwest::{Client, RequestBuilder, Url};
use std::time::Duration;

#[cfg(test)]
mod tests;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Trading Accounts API.
#[derive(Debug, Clone)]
pub struct AccountsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl AccountsClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Returns a copy of this client that sends the given bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token currently attached, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Fetches the welcome message.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn root(&self) -> Result<MessageResponse, Error> {
        let url = format!("{}/", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Exchanges credentials for a bearer token.
    ///
    /// # Errors
    /// Returns `Error::Unauthorized` if the credentials are rejected.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, Error> {
        let url = format!("{}/api/v1/auth/login", self.base_url);
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self.client.post(&url).json(&body).send().await?;
        self.handle_response(resp).await
    }

    /// Greets the token holder.
    ///
    /// # Errors
    /// Returns error if the request fails or the token is rejected.
    pub async fn hello(&self) -> Result<MessageResponse, Error> {
        let url = format!("{}/api/v1/hello", self.base_url);
        let resp = self.authorized(self.client.get(&url)).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Lists all account records.
    ///
    /// # Errors
    /// Returns error if the request fails or the token is rejected.
    pub async fn list_accounts(&self) -> Result<Vec<Record>, Error> {
        let url = format!("{}/api/v1/accounts", self.base_url);
        let resp = self.authorized(self.client.get(&url)).send().await?;
        self.handle_response(resp).await
    }

    /// Creates an account record.
    ///
    /// # Errors
    /// Returns `Error::InvalidRequest` if a record for the user exists.
    pub async fn create_account(&self, record: &Record) -> Result<MessageResponse, Error> {
        let url = format!("{}/api/v1/accounts", self.base_url);
        let resp = self
            .authorized(self.client.post(&url))
            .json(record)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Replaces the record keyed by `user`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no record exists for `user`.
    pub async fn update_account(
        &self,
        user: &str,
        record: &Record,
    ) -> Result<MessageResponse, Error> {
        let url = self.account_url(user)?;
        let resp = self
            .authorized(self.client.put(url))
            .json(record)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Deletes the record keyed by `user`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no record exists for `user`.
    pub async fn delete_account(&self, user: &str) -> Result<MessageResponse, Error> {
        let url = self.account_url(user)?;
        let resp = self.authorized(self.client.delete(url)).send().await?;
        self.handle_response(resp).await
    }

    /// Restores the table from the backup slot.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no backup is available.
    pub async fn restore_backup(&self) -> Result<MessageResponse, Error> {
        let url = format!("{}/api/v1/backup/restore", self.base_url);
        let resp = self.authorized(self.client.post(&url)).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Random Numbers
    // ========================================================================

    /// Draws a random number.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn random_number(&self) -> Result<RandomNumberResponse, Error> {
        let url = format!("{}/api/v1/random", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// URL of the record keyed by `user`, with the key percent-encoded as a
    /// single path segment.
    fn account_url(&self, user: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}/api/v1/accounts", self.base_url))
            .map_err(|e| Error::InvalidRequest(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidRequest(format!("invalid base URL: {}", self.base_url)))?
            .push(user);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = error_message(&text);
        Err(match status.as_u16() {
            400 => Error::InvalidRequest(message),
            401 => Error::Unauthorized(message),
            404 => Error::NotFound(message),
            status => Error::Api { status, message },
        })
    }
}

/// Pulls the `error` field out of an API error body, falling back to the raw
/// text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|err| err.error)
        .unwrap_or_else(|_| body.to_string())
}
