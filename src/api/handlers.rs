//! API request handlers.

use crate::api::middleware::{BearerToken, CurrentUser};
use crate::error::ApiError;
use crate::models::{
    HealthResponse, LoginRequest, MessageResponse, RandomNumberResponse, Record, TokenResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// Inclusive range of the random number demo.
const RANDOM_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

// ============================================================================
// Health Check
// ============================================================================

/// Welcome message.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse)
    ),
    tag = "Health"
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the backend!"))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Authentication
// ============================================================================

/// Issue a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !state.credentials.verify(&body.username, &body.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = state.gate.tokens().issue_default(&body.username)?;

    if let Some(ref db) = state.db {
        db.record_session(&body.username, &access_token).await?;
    }

    info!("Issued token for {}", body.username);
    Ok(Json(TokenResponse::bearer(access_token)))
}

/// Greet the token holder.
#[utoipa::path(
    get,
    path = "/api/v1/hello",
    responses(
        (status = 200, description = "Greeting", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer" = [])),
    tag = "Authentication"
)]
pub async fn hello(user: CurrentUser) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("Hello, {}!", user.username)))
}

// ============================================================================
// Accounts
// ============================================================================

/// List all account records.
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Account records in file order", body = Vec<Record>),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<Vec<Record>>, ApiError> {
    let records = state.gate.list(&token).await?;
    Ok(Json(records))
}

/// Create an account record.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = Record,
    responses(
        (status = 200, description = "Record created", body = MessageResponse),
        (status = 400, description = "A record for this user already exists"),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 503, description = "Store lock not acquired in time")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Json(record): Json<Record>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = record.user.clone();
    state.gate.create(&token, record).await?;
    info!("Created account record for {}", user);
    Ok(Json(MessageResponse::new("Record created successfully")))
}

/// Replace an account record.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{user}",
    params(
        ("user" = String, Path, description = "User key of the record to replace")
    ),
    request_body = Record,
    responses(
        (status = 200, description = "Record updated", body = MessageResponse),
        (status = 400, description = "New user key collides with another record"),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Path(user): Path<String>,
    Json(record): Json<Record>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.update(&token, user.clone(), record).await?;
    info!("Updated account record for {}", user);
    Ok(Json(MessageResponse::new("Record updated successfully")))
}

/// Delete an account record.
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{user}",
    params(
        ("user" = String, Path, description = "User key of the record to delete")
    ),
    responses(
        (status = 200, description = "Record deleted", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Path(user): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.delete(&token, user.clone()).await?;
    info!("Deleted account record for {}", user);
    Ok(Json(MessageResponse::new("Record deleted successfully")))
}

/// Restore the table from the backup taken before the last mutation.
#[utoipa::path(
    post,
    path = "/api/v1/backup/restore",
    responses(
        (status = 200, description = "Backup restored", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "No backup available")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.restore_backup(&token).await?;
    info!("Restored account table from backup");
    Ok(Json(MessageResponse::new("Backup restored successfully")))
}

// ============================================================================
// Random Numbers
// ============================================================================

/// Draw a random number and append it to the log.
#[utoipa::path(
    get,
    path = "/api/v1/random",
    responses(
        (status = 200, description = "Random number", body = RandomNumberResponse)
    ),
    tag = "Random"
)]
pub async fn random_number(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RandomNumberResponse>, ApiError> {
    let random_number = rand::thread_rng().gen_range(RANDOM_RANGE);
    let timestamp = Utc::now().to_rfc3339();

    if let Some(ref db) = state.db {
        db.record_random_number(&timestamp, random_number).await?;
    }

    Ok(Json(RandomNumberResponse {
        random_number,
        timestamp,
    }))
}
