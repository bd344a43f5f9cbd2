//! Application state management.

use crate::auth::{
    AcceptAnyCredentials, AuthError, CredentialVerifier, StaticCredentials, TokenService,
};
use crate::config::Config;
use crate::db::DatabasePool;
use crate::gate::AccessGate;
use crate::store::{RecordStore, StoreError, StoreOptions};
use chrono::TimeDelta;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors while building the application state.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Token service could not be created.
    #[error("auth setup failed: {0}")]
    Auth(#[from] AuthError),
    /// The account table could not be opened.
    #[error("store setup failed: {0}")]
    Store(#[from] StoreError),
    /// The log database could not be opened.
    #[error("database setup failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Token-gated access to the account table.
    pub gate: AccessGate,
    /// Login credential check.
    pub credentials: Arc<dyn CredentialVerifier>,
    /// Optional session and random number log database.
    pub db: Option<DatabasePool>,
}

impl AppState {
    /// Creates a new application state without database, accepting any
    /// login credentials.
    #[must_use]
    pub fn new(gate: AccessGate) -> Self {
        Self {
            gate,
            credentials: Arc::new(AcceptAnyCredentials),
            db: None,
        }
    }

    /// Replaces the credential verifier.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Attaches the log database.
    #[must_use]
    pub fn with_database(mut self, db: DatabasePool) -> Self {
        self.db = Some(db);
        self
    }

    /// Builds the application state from configuration.
    ///
    /// # Errors
    /// Returns an error if the token service, the account table or the log
    /// database cannot be set up.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        if config.auth.uses_default_secret() {
            warn!("Using the default token secret; set auth.secret or TOKEN_SECRET");
        }

        let tokens = TokenService::new(
            config.auth.secret.as_bytes(),
            TimeDelta::minutes(config.auth.token_ttl_minutes),
        )?;

        let store = RecordStore::open(
            &config.store.path,
            StoreOptions {
                lock_timeout: config.store.lock_timeout(),
            },
        )?;
        info!("Account table at {}", store.path().display());

        let mut state = Self::new(AccessGate::new(Arc::new(tokens), Arc::new(store)));

        if !config.auth.users.is_empty() {
            let users = config
                .auth
                .users
                .iter()
                .map(|u| (u.username.clone(), u.password_sha256.clone()));
            let credentials = StaticCredentials::new(users);
            info!("Login restricted to {} configured users", credentials.len());
            state = state.with_credentials(Arc::new(credentials));
        }

        if config.database.enabled {
            let db = DatabasePool::new(&config.database.url).await?;
            db.run_migrations().await?;
            state = state.with_database(db);
        }

        Ok(state)
    }
}
