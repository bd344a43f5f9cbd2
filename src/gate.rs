//! Token-gated access to the record store.
//!
//! Each call validates the bearer token first and only then runs the store
//! operation, on tokio's blocking pool since lock waits and file I/O block.
//! A rejected token never reaches the store.

use crate::auth::{AuthError, TokenService};
use crate::models::Record;
use crate::store::{RecordStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Token rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    TaskFailed(String),
}

/// Validates tokens and forwards to the [`RecordStore`].
#[derive(Debug, Clone)]
pub struct AccessGate {
    tokens: Arc<TokenService>,
    store: Arc<RecordStore>,
}

impl AccessGate {
    /// Creates a gate over `store` using `tokens` for validation.
    pub fn new(tokens: Arc<TokenService>, store: Arc<RecordStore>) -> Self {
        Self { tokens, store }
    }

    /// The token service used for validation.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The gated store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Validates `token` and returns its subject.
    ///
    /// # Errors
    /// Returns [`GateError::Auth`] if the token is malformed or expired.
    pub fn authorize(&self, token: &str) -> Result<String, GateError> {
        Ok(self.tokens.validate(token)?)
    }

    /// Lists all records.
    ///
    /// # Errors
    /// Returns an auth error or the store's error.
    pub async fn list(&self, token: &str) -> Result<Vec<Record>, GateError> {
        let subject = self.authorize(token)?;
        debug!(%subject, "list accounts");
        self.run(|store| store.list()).await
    }

    /// Creates `record`.
    ///
    /// # Errors
    /// Returns an auth error or the store's error.
    pub async fn create(&self, token: &str, record: Record) -> Result<(), GateError> {
        let subject = self.authorize(token)?;
        debug!(%subject, user = %record.user, "create account");
        self.run(move |store| store.create(record)).await
    }

    /// Replaces the record for `user`.
    ///
    /// # Errors
    /// Returns an auth error or the store's error.
    pub async fn update(&self, token: &str, user: String, record: Record) -> Result<(), GateError> {
        let subject = self.authorize(token)?;
        debug!(%subject, %user, "update account");
        self.run(move |store| store.update(&user, record)).await
    }

    /// Deletes the record for `user`.
    ///
    /// # Errors
    /// Returns an auth error or the store's error.
    pub async fn delete(&self, token: &str, user: String) -> Result<(), GateError> {
        let subject = self.authorize(token)?;
        debug!(%subject, %user, "delete account");
        self.run(move |store| store.delete(&user)).await
    }

    /// Restores the backup slot.
    ///
    /// # Errors
    /// Returns an auth error or the store's error.
    pub async fn restore_backup(&self, token: &str) -> Result<(), GateError> {
        let subject = self.authorize(token)?;
        debug!(%subject, "restore account backup");
        self.run(|store| store.restore_backup()).await
    }

    async fn run<T, F>(&self, operation: F) -> Result<T, GateError>
    where
        T: Send + 'static,
        F: FnOnce(&RecordStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || operation(&store))
            .await
            .map_err(|e| GateError::TaskFailed(e.to_string()))?;
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BackupError, StoreOptions};
    use chrono::{TimeDelta, Utc};
    use tempfile::TempDir;

    fn gate(dir: &TempDir) -> AccessGate {
        let tokens = TokenService::new(b"gate-secret", TimeDelta::minutes(30)).unwrap();
        let store =
            RecordStore::open(dir.path().join("accounts.csv"), StoreOptions::default()).unwrap();
        AccessGate::new(Arc::new(tokens), Arc::new(store))
    }

    fn record(user: &str) -> Record {
        Record {
            user: user.to_string(),
            broker: "X".to_string(),
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
            pnl: 1.0,
            margin: 2.0,
            max_risk: 3.0,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_alice() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let token = gate.tokens().issue("alice", TimeDelta::minutes(5)).unwrap();

        gate.create(&token, record("alice")).await.unwrap();

        let duplicate = gate.create(&token, record("alice")).await;
        assert!(matches!(
            duplicate,
            Err(GateError::Store(StoreError::DuplicateKey(_)))
        ));

        gate.delete(&token, "alice".to_string()).await.unwrap();
        assert!(gate.list(&token).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_token_never_reaches_store() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);

        let result = gate.create("not-a-token", record("alice")).await;

        assert!(matches!(
            result,
            Err(GateError::Auth(AuthError::TokenMalformed))
        ));
        assert!(!gate.store().has_backup());
        assert!(gate.store().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let token = gate
            .tokens()
            .issue_at("alice", TimeDelta::minutes(1), Utc::now() - TimeDelta::hours(1))
            .unwrap();

        assert!(matches!(
            gate.list(&token).await,
            Err(GateError::Auth(AuthError::TokenExpired))
        ));
        assert!(matches!(
            gate.restore_backup(&token).await,
            Err(GateError::Auth(AuthError::TokenExpired))
        ));
    }

    #[tokio::test]
    async fn test_update_and_restore_through_gate() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let token = gate.tokens().issue("ops", TimeDelta::minutes(5)).unwrap();

        gate.create(&token, record("alice")).await.unwrap();
        let mut changed = record("alice");
        changed.pnl = 99.0;
        gate.update(&token, "alice".to_string(), changed.clone())
            .await
            .unwrap();
        assert_eq!(gate.list(&token).await.unwrap(), vec![changed]);

        gate.restore_backup(&token).await.unwrap();
        assert_eq!(gate.list(&token).await.unwrap(), vec![record("alice")]);

        assert!(matches!(
            gate.restore_backup(&token).await,
            Err(GateError::Store(StoreError::Backup(
                BackupError::NoBackupAvailable
            )))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let token = gate.tokens().issue("ops", TimeDelta::minutes(5)).unwrap();

        let result = gate
            .update(&token, "ghost".to_string(), record("ghost"))
            .await;
        assert!(matches!(
            result,
            Err(GateError::Store(StoreError::NotFound(_)))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_creates_through_gate() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let token = gate.tokens().issue("ops", TimeDelta::minutes(5)).unwrap();

        let (first, second) = tokio::join!(
            gate.create(&token, record("alice")),
            gate.create(&token, record("bob"))
        );
        first.unwrap();
        second.unwrap();

        let mut users: Vec<String> = gate
            .list(&token)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user)
            .collect();
        users.sort();
        assert_eq!(users, vec!["alice", "bob"]);
    }
}
