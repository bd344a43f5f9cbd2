//! Request and response models for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A trading account row.
///
/// Field names match the column headers of the backing file, so the same
/// serde representation is used for both the CSV table and the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    /// Account owner. Unique within the table.
    pub user: String,
    /// Broker name.
    pub broker: String,
    /// Broker API key.
    #[serde(rename = "API key")]
    pub api_key: String,
    /// Broker API secret.
    #[serde(rename = "API secret")]
    pub api_secret: String,
    /// Realised profit and loss.
    pub pnl: f64,
    /// Available margin.
    pub margin: f64,
    /// Maximum risk allowed for the account.
    pub max_risk: f64,
}

/// Column order of the backing file.
pub const RECORD_COLUMNS: [&str; 7] = [
    "user",
    "broker",
    "API key",
    "API secret",
    "pnl",
    "margin",
    "max_risk",
];

/// Login credentials.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Username; becomes the token subject.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

impl TokenResponse {
    /// Wraps an access token as a bearer token response.
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Generic acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a new message response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Response of the random number endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RandomNumberResponse {
    /// The drawn number.
    pub random_number: i64,
    /// RFC 3339 timestamp of the draw.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            user: "alice".to_string(),
            broker: "X".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            pnl: 12.5,
            margin: 1000.0,
            max_risk: 0.2,
        }
    }

    #[test]
    fn test_record_json_uses_column_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"user\":\"alice\""));
        assert!(json.contains("\"API key\":\"key\""));
        assert!(json.contains("\"API secret\":\"secret\""));
        assert!(json.contains("\"max_risk\":0.2"));
    }

    #[test]
    fn test_record_json_rejects_missing_field() {
        let json = r#"{"user":"bob","broker":"Y","API key":"k","pnl":1.0,"margin":2.0,"max_risk":3.0}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn test_token_response_bearer() {
        let response = TokenResponse::bearer("abc".to_string());
        assert_eq!(response.token_type, "bearer");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"access_token\":\"abc\""));
    }

    #[test]
    fn test_record_columns_order() {
        assert_eq!(RECORD_COLUMNS[0], "user");
        assert_eq!(RECORD_COLUMNS[2], "API key");
        assert_eq!(RECORD_COLUMNS[6], "max_risk");
    }
}
