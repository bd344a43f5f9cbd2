//! Unit tests for client module.

use super::*;

// ============================================================================
// ClientConfig Tests
// ============================================================================

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.timeout, Duration::from_secs(30));
}

#[test]
fn test_client_config_custom() {
    let config = ClientConfig {
        base_url: "http://api.example.com:9000".to_string(),
        timeout: Duration::from_secs(60),
    };

    assert_eq!(config.base_url, "http://api.example.com:9000");
    assert_eq!(config.timeout, Duration::from_secs(60));
}

// ============================================================================
// AccountsClient Creation Tests
// ============================================================================

#[test]
fn test_accounts_client_new() {
    let client = AccountsClient::new(ClientConfig::default()).unwrap();
    assert!(client.token().is_none());
}

#[test]
fn test_accounts_client_base_url_trimmed() {
    let client = AccountsClient::with_base_url("http://localhost:3000/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:3000");
}

#[test]
fn test_accounts_client_with_token() {
    let client = AccountsClient::with_base_url("http://localhost:3000")
        .unwrap()
        .with_token("a.b.c");
    assert_eq!(client.token(), Some("a.b.c"));
}

#[test]
fn test_authorized_sets_bearer_header() {
    let client = AccountsClient::with_base_url("http://localhost:3000")
        .unwrap()
        .with_token("a.b.c");
    let request = client
        .authorized(client.client.get("http://localhost:3000/api/v1/accounts"))
        .build()
        .unwrap();

    assert_eq!(
        request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
        "Bearer a.b.c"
    );
}

#[test]
fn test_authorized_without_token() {
    let client = AccountsClient::with_base_url("http://localhost:3000").unwrap();
    let request = client
        .authorized(client.client.get("http://localhost:3000/api/v1/accounts"))
        .build()
        .unwrap();

    assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
}

// ============================================================================
// Account URL Tests
// ============================================================================

#[test]
fn test_account_url_plain_user() {
    let client = AccountsClient::with_base_url("http://localhost:3000").unwrap();
    let url = client.account_url("alice").unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/api/v1/accounts/alice");
}

#[test]
fn test_account_url_encodes_reserved_characters() {
    let client = AccountsClient::with_base_url("http://localhost:3000").unwrap();

    let url = client.account_url("desk/1").unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/api/v1/accounts/desk%2F1");

    let url = client.account_url("a#b").unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/api/v1/accounts/a%23b");
    assert!(url.fragment().is_none());

    let url = client.account_url("a?b").unwrap();
    assert!(url.query().is_none());
}

#[test]
fn test_account_url_keeps_base_path() {
    let client = AccountsClient::with_base_url("http://localhost:3000/prefix/").unwrap();
    let url = client.account_url("bob").unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/prefix/api/v1/accounts/bob");
}

#[test]
fn test_account_url_rejects_bad_base() {
    let client = AccountsClient::with_base_url("not a url").unwrap();
    assert!(matches!(
        client.account_url("alice"),
        Err(Error::InvalidRequest(_))
    ));
}

// ============================================================================
// Error Body Tests
// ============================================================================

#[test]
fn test_error_message_from_json_body() {
    let body = r#"{"error":"Token expired","code":"TOKEN_EXPIRED"}"#;
    assert_eq!(error_message(body), "Token expired");
}

#[test]
fn test_error_message_from_plain_body() {
    assert_eq!(error_message("bad gateway"), "bad gateway");
}
