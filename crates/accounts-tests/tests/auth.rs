//! Login and token check tests.

use accounts_client::Error;
use accounts_tests::TestServer;
use chrono::TimeDelta;

#[tokio::test]
async fn test_login_and_hello() {
    let server = TestServer::spawn().await;

    let client = server.client();
    let token = client.login("alice", "pw").await.expect("login");
    assert_eq!(token.token_type, "bearer");

    let hello = client
        .with_token(token.access_token)
        .hello()
        .await
        .expect("hello");
    assert_eq!(hello.message, "Hello, alice!");
}

#[tokio::test]
async fn test_login_records_session() {
    let server = TestServer::spawn().await;

    let client = server.client();
    let first = client.login("alice", "pw").await.expect("login");
    let second = client.login("alice", "pw").await.expect("login");
    assert_ne!(first.access_token, second.access_token);

    let db = server.state.db.as_ref().expect("database");
    let sessions = db.sessions_for("alice").await.expect("sessions");
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_token, first.access_token);
    assert_eq!(sessions[1].session_token, second.access_token);
}

#[tokio::test]
async fn test_login_with_configured_users() {
    let server = TestServer::spawn_with_users(&[("alice", "s3cret")]).await;
    let client = server.client();

    assert!(client.login("alice", "s3cret").await.is_ok());

    let err = client.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(ref msg) if msg == "Incorrect username or password"));

    let err = client.login("mallory", "s3cret").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = TestServer::spawn().await;
    let client = server.client();

    assert!(matches!(
        client.list_accounts().await.unwrap_err(),
        Error::Unauthorized(_)
    ));
    assert!(matches!(
        client.hello().await.unwrap_err(),
        Error::Unauthorized(_)
    ));
    assert!(matches!(
        client.restore_backup().await.unwrap_err(),
        Error::Unauthorized(_)
    ));
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let server = TestServer::spawn().await;
    let client = server.client().with_token("not-a-token");

    let err = client.list_accounts().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(ref msg) if msg == "Invalid token"));
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let server = TestServer::spawn().await;
    let client = server.client_with_ttl("alice", TimeDelta::zero());

    let err = client.list_accounts().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(ref msg) if msg == "Token expired"));
}

#[tokio::test]
async fn test_rejected_token_leaves_table_untouched() {
    let server = TestServer::spawn().await;
    let bad = server.client().with_token("a.b.c");

    let err = bad
        .create_account(&accounts_tests::record("alice", "ib"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    let store = server.state.gate.store();
    assert!(store.list().expect("list").is_empty());
    assert!(!store.has_backup());
}
