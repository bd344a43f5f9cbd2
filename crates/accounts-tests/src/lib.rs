//! Integration tests for the Trading Accounts API.
//!
//! Each test spawns the real router on an ephemeral local port, backed by a
//! fresh temporary account table and an in-memory log database, and talks to
//! it through [`accounts_client::AccountsClient`].

use accounts_client::{AccountsClient, ClientConfig, Record};
use chrono::TimeDelta;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use trading_accounts_backend::api::create_router;
use trading_accounts_backend::auth::{CredentialVerifier, StaticCredentials, TokenService};
use trading_accounts_backend::db::DatabasePool;
use trading_accounts_backend::gate::AccessGate;
use trading_accounts_backend::state::AppState;
use trading_accounts_backend::store::{RecordStore, StoreOptions};

/// Secret used to sign tokens in tests.
pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// A running server and the resources that back it.
pub struct TestServer {
    /// Address the server listens on.
    pub addr: SocketAddr,
    /// Shared state, for inspecting the store and log database.
    pub state: Arc<AppState>,
    _dir: TempDir,
}

impl TestServer {
    /// Spawns a server that accepts any login credentials.
    pub async fn spawn() -> Self {
        Self::spawn_with(None).await
    }

    /// Spawns a server that only accepts the given `(username, password)` pairs.
    pub async fn spawn_with_users(users: &[(&str, &str)]) -> Self {
        let credentials = StaticCredentials::new(users.iter().map(|(name, password)| {
            (name.to_string(), StaticCredentials::hash_password(password))
        }));
        Self::spawn_with(Some(Arc::new(credentials))).await
    }

    async fn spawn_with(credentials: Option<Arc<dyn CredentialVerifier>>) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let tokens =
            TokenService::new(TEST_SECRET, TimeDelta::minutes(60)).expect("token service");
        let store = RecordStore::open(dir.path().join("accounts.csv"), StoreOptions::default())
            .expect("open store");
        let db = DatabasePool::in_memory().await.expect("in-memory database");
        db.run_migrations().await.expect("migrations");

        let mut state = AppState::new(AccessGate::new(Arc::new(tokens), Arc::new(store)))
            .with_database(db);
        if let Some(credentials) = credentials {
            state = state.with_credentials(credentials);
        }
        let state = Arc::new(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = create_router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server");
        });

        Self {
            addr,
            state,
            _dir: dir,
        }
    }

    /// Base URL of the running server.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client without a token.
    pub fn client(&self) -> AccountsClient {
        AccountsClient::new(ClientConfig {
            base_url: self.url(),
            timeout: Duration::from_secs(10),
        })
        .expect("client")
    }

    /// Client holding a token obtained through the login endpoint.
    pub async fn login(&self, username: &str) -> AccountsClient {
        let client = self.client();
        let token = client.login(username, "password").await.expect("login");
        client.with_token(token.access_token)
    }

    /// Client holding a token signed by the server's key with the given lifetime.
    pub fn client_with_ttl(&self, username: &str, ttl: TimeDelta) -> AccountsClient {
        let token = self
            .state
            .gate
            .tokens()
            .issue(username, ttl)
            .expect("issue token");
        self.client().with_token(token)
    }
}

/// Builds a record with the given user key and broker.
#[must_use]
pub fn record(user: &str, broker: &str) -> Record {
    Record::new(user, broker, &format!("{user}-key"), &format!("{user}-secret"))
}
