//! Request and response types for the accounts API.

use serde::{Deserialize, Serialize};


/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// API version.
    pub version: String,
}

/// Plain message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

/// One trading account record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique key.
    pub user: String,
    /// Broker name.
    pub broker: String,
    /// Broker API key.
    #[serde(rename = "API key")]
    pub api_key: String,
    /// Broker API secret.
    #[serde(rename = "API secret")]
    pub api_secret: String,
    /// Profit and loss.
    pub pnl: f64,
    /// Margin.
    pub margin: f64,
    /// Maximum risk.
    pub max_risk: f64,
}

impl Record {
    /// Creates a record with zeroed numeric fields.
    #[must_use]
    pub fn new(user: &str, broker: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            user: user.to_string(),
            broker: broker.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            pnl: 0.0,
            margin: 0.0,
            max_risk: 0.0,
        }
    }
}

/// Random number draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomNumberResponse {
    /// Drawn value.
    pub random_number: i64,
    /// RFC 3339 timestamp of the draw.
    pub timestamp: String,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}
