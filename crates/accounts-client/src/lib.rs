//! HTTP client library for the Trading Accounts API.
//!
//! This crate provides a typed HTTP client for the trading accounts backend.
//! Data endpoints need a bearer token; obtain one with
//! [`AccountsClient::login`] and attach it with [`AccountsClient::with_token`].
//!
//! # Example
//!
//! ```no_run
//! use accounts_client::{AccountsClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), accounts_client::Error> {
//!     let client = AccountsClient::new(ClientConfig::default())?;
//!
//!     let token = client.login("alice", "secret").await?;
//!     let client = client.with_token(token.access_token);
//!
//!     for record in client.list_accounts().await? {
//!         println!("{} @ {}", record.user, record.broker);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{AccountsClient, ClientConfig};
pub use error::Error;
pub use types::*;
