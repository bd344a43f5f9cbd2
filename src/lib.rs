//! # Trading Accounts Backend - REST API Server
//!
//! An authenticated CRUD backend for trading account records. Records live in
//! a flat delimited file guarded by a cross-process lock, every mutation
//! first copies the file into a single backup slot, and every data operation
//! requires a signed bearer token.
//! Built with [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Flat-File Record Store**: One header row plus one row per account,
//!   keyed by `user`. Writes replace the file atomically.
//!
//! - **Cross-Process Locking**: Mutations serialize on an advisory lock on a
//!   sentinel file next to the table, so several server processes can share
//!   one backing file.
//!
//! - **Single-Slot Backup**: Each create, update or delete snapshots the
//!   table first; a restore consumes the slot.
//!
//! - **Bearer Tokens**: HMAC-SHA256 signed compact tokens carrying subject
//!   and expiry.
//!
//! - **Structured Logging**: Request tracing with `tower-http` and store
//!   events through a pluggable observer.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handler ──► AccessGate ──► TokenService (validate)
//!                      │
//!                      └──► RecordStore ──► lock ──► BackupManager ──► codec
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers, bearer extraction and router configuration |
//! | [`auth`] | Token issuance/validation and login credential checks |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`db`] | SQLite session and random number logs |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`gate`] | Token-checked access to the record store |
//! | [`models`] | Record and request/response DTOs with OpenAPI schemas |
//! | [`state`] | Application state management |
//! | [`store`] | Record store, lock, backup slot and file codec |
//!
//! ## API Endpoints
//!
//! ### Health
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/` | Welcome message |
//! | GET | `/health` | Health check |
//!
//! ### Authentication
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/v1/auth/login` | Issue a bearer token |
//! | GET | `/api/v1/hello` | Greet the token holder |
//!
//! ### Accounts
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/accounts` | List all records |
//! | POST | `/api/v1/accounts` | Create a record |
//! | PUT | `/api/v1/accounts/{user}` | Replace a record |
//! | DELETE | `/api/v1/accounts/{user}` | Delete a record |
//! | POST | `/api/v1/backup/restore` | Restore the last backup |
//!
//! ### Random
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/random` | Draw and log a random number |
//!
//! ## Example Usage
//!
//! ### Starting the Server
//!
//! ```bash
//! # Development mode
//! cargo run
//!
//! # With a config file and custom port
//! CONFIG_PATH=config.toml PORT=3000 cargo run
//! ```
//!
//! ### API Requests
//!
//! ```bash
//! # Get a token
//! TOKEN=$(curl -s -X POST http://localhost:8080/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "secret"}' | jq -r .access_token)
//!
//! # Create a record
//! curl -X POST http://localhost:8080/api/v1/accounts \
//!   -H "Authorization: Bearer $TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"user": "alice", "broker": "ib", "API key": "k", "API secret": "s", "pnl": 0, "margin": 0, "max_risk": 0}'
//!
//! # List records
//! curl http://localhost:8080/api/v1/accounts -H "Authorization: Bearer $TOKEN"
//!
//! # Undo the last mutation
//! curl -X POST http://localhost:8080/api/v1/backup/restore -H "Authorization: Bearer $TOKEN"
//! ```
//!
//! ## Swagger UI
//!
//! Once the server is running, access the interactive API documentation at:
//!
//! ```text
//! http://localhost:8080/swagger-ui/
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod models;
pub mod state;
pub mod store;
