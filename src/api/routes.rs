//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post, put};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Authentication
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/hello", get(handlers::hello))
        // Accounts
        .route(
            "/api/v1/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/api/v1/accounts/{user}",
            put(handlers::update_account).delete(handlers::delete_account),
        )
        .route("/api/v1/backup/restore", post(handlers::restore_backup))
        // Random numbers
        .route("/api/v1/random", get(handlers::random_number))
        .with_state(state)
}
