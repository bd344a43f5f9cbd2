//! Bearer token issuance, validation and login credential checks.
//!
//! Tokens are compact HS256 JWS strings (`header.claims.signature`, each part
//! base64url without padding). They are self-contained: validity is recomputed
//! from the embedded expiry on every call and there is no server-side
//! revocation list, so a leaked token stays usable until it expires.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm written into every token header.
const TOKEN_ALGORITHM: &str = "HS256";

/// Default token lifetime in minutes (24 hours).
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Login rejected by the credential verifier.
    #[error("Incorrect username or password")]
    InvalidCredentials,
    /// Token signature is valid but its expiry has passed.
    #[error("Token expired")]
    TokenExpired,
    /// Token could not be decoded or its signature does not match.
    #[error("Invalid token")]
    TokenMalformed,
    /// The signing secret is unusable.
    #[error("token secret must not be empty")]
    InvalidSecret,
    /// Token could not be encoded.
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried by a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the username the token was issued to).
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch with millisecond fraction.
    pub iat: f64,
    /// Expiry, seconds since the Unix epoch with millisecond fraction.
    pub exp: f64,
    /// Unique token id.
    pub jti: String,
}

/// A decoded, verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token subject.
    pub subject: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token stops being valid.
    pub expiry: DateTime<Utc>,
}

/// Issues and validates signed bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
    default_ttl: TimeDelta,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service signing with `secret`.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidSecret`] if the secret is empty.
    pub fn new(secret: &[u8], default_ttl: TimeDelta) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidSecret)?;
        Ok(Self { mac, default_ttl })
    }

    /// Default lifetime applied by [`TokenService::issue_default`].
    #[must_use]
    pub fn default_ttl(&self) -> TimeDelta {
        self.default_ttl
    }

    /// Issues a token for `subject` with the default lifetime.
    ///
    /// # Errors
    /// Returns [`AuthError::Encoding`] if the token cannot be built.
    pub fn issue_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, self.default_ttl)
    }

    /// Issues a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// Returns [`AuthError::Encoding`] if the token cannot be built.
    pub fn issue(&self, subject: &str, ttl: TimeDelta) -> Result<String, AuthError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns [`AuthError::Encoding`] if the expiry overflows or the claims
    /// cannot be serialized.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let issued_ms = now.timestamp_millis();
        let expiry_ms = issued_ms
            .checked_add(ceil_millis(ttl))
            .ok_or_else(|| AuthError::Encoding("token expiry out of range".to_string()))?;

        let header = TokenHeader {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            sub: subject.to_string(),
            iat: millis_to_numeric_date(issued_ms),
            exp: millis_to_numeric_date(expiry_ms),
            jti: Uuid::new_v4().to_string(),
        };

        let header = serde_json::to_vec(&header).map_err(|e| AuthError::Encoding(e.to_string()))?;
        let claims = serde_json::to_vec(&claims).map_err(|e| AuthError::Encoding(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let signature = self.sign(&signing_input);

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Validates `token` against the current time and returns its subject.
    ///
    /// # Errors
    /// Returns [`AuthError::TokenMalformed`] or [`AuthError::TokenExpired`].
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates `token` as if the current time were `now`.
    ///
    /// # Errors
    /// Returns [`AuthError::TokenMalformed`] or [`AuthError::TokenExpired`].
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.decode_at(token, now).map(|token| token.subject)
    }

    /// Verifies `token` and returns its decoded form.
    ///
    /// A token whose expiry equals `now` is already expired.
    ///
    /// # Errors
    /// Returns [`AuthError::TokenMalformed`] or [`AuthError::TokenExpired`].
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Token, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::TokenMalformed);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::TokenMalformed)?;
        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(claims.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::TokenMalformed)?;

        let header: TokenHeader = decode_part(header)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(AuthError::TokenMalformed);
        }

        let claims: Claims = decode_part(claims)?;
        if claims.sub.is_empty() {
            return Err(AuthError::TokenMalformed);
        }

        let issued_at = numeric_date_to_time(claims.iat)?;
        let expiry = numeric_date_to_time(claims.exp)?;

        if now.timestamp_millis() >= expiry.timestamp_millis() {
            return Err(AuthError::TokenExpired);
        }

        Ok(Token {
            subject: claims.sub,
            issued_at,
            expiry,
        })
    }

    fn sign(&self, signing_input: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// `ttl` in whole milliseconds, rounded up so a positive ttl never becomes 0.
fn ceil_millis(ttl: TimeDelta) -> i64 {
    let millis = ttl.num_milliseconds();
    if ttl > TimeDelta::milliseconds(millis) {
        millis + 1
    } else {
        millis
    }
}

fn millis_to_numeric_date(millis: i64) -> f64 {
    millis as f64 / 1000.0
}

fn numeric_date_to_time(seconds: f64) -> Result<DateTime<Utc>, AuthError> {
    if !seconds.is_finite() {
        return Err(AuthError::TokenMalformed);
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
        .ok_or(AuthError::TokenMalformed)
}

fn decode_part<T: serde::de::DeserializeOwned>(part: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| AuthError::TokenMalformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::TokenMalformed)
}

// ============================================================================
// Credentials
// ============================================================================

/// Checks login credentials before a token is issued.
pub trait CredentialVerifier: Send + Sync + fmt::Debug {
    /// Returns true if `password` is accepted for `username`.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts every username/password pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAnyCredentials;

impl CredentialVerifier for AcceptAnyCredentials {
    fn verify(&self, _username: &str, _password: &str) -> bool {
        true
    }
}

/// Fixed set of users with SHA-256 password digests.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    /// Hex SHA-256 digest of each user's password.
    users: HashMap<String, String>,
}

impl StaticCredentials {
    /// Creates a verifier from `(username, password_sha256_hex)` pairs.
    pub fn new(users: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|(name, digest)| (name, digest.to_ascii_lowercase()))
                .collect(),
        }
    }

    /// Hashes a password the way stored digests are expected to be.
    #[must_use]
    pub fn hash_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Number of configured users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|digest| *digest == Self::hash_password(password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", TimeDelta::minutes(DEFAULT_TOKEN_TTL_MINUTES)).unwrap()
    }

    #[test]
    fn test_issue_then_validate_returns_subject() {
        let tokens = service();
        let token = tokens.issue("alice", TimeDelta::minutes(5)).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "alice");
    }

    #[test]
    fn test_issue_default_uses_configured_ttl() {
        let tokens = service();
        let now = Utc::now();
        let token = tokens.issue_default("bob").unwrap();
        let decoded = tokens.decode_at(&token, now).unwrap();
        let lifetime = decoded.expiry - decoded.issued_at;
        assert_eq!(lifetime, TimeDelta::minutes(DEFAULT_TOKEN_TTL_MINUTES));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let tokens = service();
        let now = Utc::now();
        let token = tokens.issue_at("alice", TimeDelta::zero(), now).unwrap();
        assert_eq!(
            tokens.validate_at(&token, now),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let tokens = service();
        let issued = Utc::now() - TimeDelta::hours(2);
        let token = tokens.issue_at("alice", TimeDelta::hours(1), issued).unwrap();
        assert_eq!(tokens.validate(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_validity_is_checked_at_call_time() {
        let tokens = service();
        let now = Utc::now();
        let token = tokens.issue_at("alice", TimeDelta::seconds(10), now).unwrap();
        assert!(tokens.validate_at(&token, now + TimeDelta::seconds(9)).is_ok());
        assert_eq!(
            tokens.validate_at(&token, now + TimeDelta::seconds(10)),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_subsecond_ttl_valid_immediately() {
        let tokens = service();
        let now = DateTime::from_timestamp_millis(1_700_000_000_500).unwrap();
        let token = tokens
            .issue_at("alice", TimeDelta::milliseconds(100), now)
            .unwrap();
        assert_eq!(tokens.validate_at(&token, now), Ok("alice".to_string()));
        assert!(
            tokens
                .validate_at(&token, now + TimeDelta::milliseconds(99))
                .is_ok()
        );
        assert_eq!(
            tokens.validate_at(&token, now + TimeDelta::milliseconds(100)),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_submillisecond_ttl_still_valid_at_issue() {
        let tokens = service();
        let now = DateTime::from_timestamp_millis(1_700_000_000_999).unwrap()
            + TimeDelta::microseconds(900);
        let token = tokens
            .issue_at("alice", TimeDelta::microseconds(50), now)
            .unwrap();
        assert_eq!(tokens.validate_at(&token, now), Ok("alice".to_string()));
    }

    #[test]
    fn test_expiry_keeps_millisecond_precision() {
        let tokens = service();
        let now = DateTime::from_timestamp_millis(1_700_000_000_250).unwrap();
        let token = tokens
            .issue_at("alice", TimeDelta::milliseconds(1_500), now)
            .unwrap();
        let decoded = tokens.decode_at(&token, now).unwrap();
        assert_eq!(decoded.issued_at, now);
        assert_eq!(decoded.expiry, now + TimeDelta::milliseconds(1_500));
    }

    #[test]
    fn test_tampered_claims_are_malformed() {
        let tokens = service();
        let token = tokens.issue("alice", TimeDelta::minutes(5)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                sub: "mallory".to_string(),
                iat: 0.0,
                exp: 4_000_000_000.0,
                jti: "x".to_string(),
            })
            .unwrap(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert_eq!(tokens.validate(&forged), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_other_secret_is_malformed() {
        let token = service().issue("alice", TimeDelta::minutes(5)).unwrap();
        let other = TokenService::new(b"other-secret", TimeDelta::minutes(5)).unwrap();
        assert_eq!(other.validate(&token), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service();
        for garbage in ["", "abc", "a.b", "a.b.c", "a.b.c.d", "...."] {
            assert_eq!(
                tokens.validate(garbage),
                Err(AuthError::TokenMalformed),
                "{garbage:?}"
            );
        }
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens = service();
        let now = Utc::now();
        let first = tokens.issue_at("alice", TimeDelta::minutes(5), now).unwrap();
        let second = tokens.issue_at("alice", TimeDelta::minutes(5), now).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = TokenService::new(b"", TimeDelta::minutes(5));
        assert!(matches!(result, Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", service());
        assert!(debug.contains("TokenService"));
        assert!(!debug.contains("test-secret"));
    }

    #[test]
    fn test_accept_any_credentials() {
        assert!(AcceptAnyCredentials.verify("anyone", "anything"));
    }

    #[test]
    fn test_static_credentials() {
        let verifier = StaticCredentials::new([(
            "alice".to_string(),
            StaticCredentials::hash_password("wonderland"),
        )]);
        assert_eq!(verifier.len(), 1);
        assert!(verifier.verify("alice", "wonderland"));
        assert!(!verifier.verify("alice", "wrong"));
        assert!(!verifier.verify("bob", "wonderland"));
    }

    #[test]
    fn test_static_credentials_accepts_uppercase_digest() {
        let digest = StaticCredentials::hash_password("pw").to_uppercase();
        let verifier = StaticCredentials::new([("carol".to_string(), digest)]);
        assert!(verifier.verify("carol", "pw"));
    }
}
