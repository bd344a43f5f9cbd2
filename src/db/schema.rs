//! Database schema types and queries.

use super::DatabasePool;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Issued token, as recorded in the session log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSession {
    /// Row id.
    pub id: i64,
    /// User the token was issued to.
    pub username: String,
    /// The issued token.
    pub session_token: String,
}

/// A logged random number draw.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RandomNumberEntry {
    /// Row id.
    pub id: i64,
    /// RFC 3339 timestamp of the draw.
    pub timestamp: String,
    /// The drawn number.
    pub random_number: i64,
}

impl DatabasePool {
    /// Appends an issued token to the session log.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn record_session(&self, username: &str, token: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO user_sessions (username, session_token) VALUES (?, ?)")
            .bind(username)
            .bind(token)
            .execute(self.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Sessions issued to `username`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn sessions_for(&self, username: &str) -> Result<Vec<UserSession>, sqlx::Error> {
        sqlx::query_as::<_, UserSession>(
            "SELECT id, username, session_token FROM user_sessions WHERE username = ? ORDER BY id",
        )
        .bind(username)
        .fetch_all(self.pool())
        .await
    }

    /// Appends a random number draw.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn record_random_number(
        &self,
        timestamp: &str,
        random_number: i64,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO random_numbers (timestamp, random_number) VALUES (?, ?)")
                .bind(timestamp)
                .bind(random_number)
                .execute(self.pool())
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// The most recent `limit` draws, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn recent_random_numbers(
        &self,
        limit: i64,
    ) -> Result<Vec<RandomNumberEntry>, sqlx::Error> {
        sqlx::query_as::<_, RandomNumberEntry>(
            "SELECT id, timestamp, random_number FROM random_numbers ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn database() -> DatabasePool {
        let db = DatabasePool::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_record_session() {
        let db = database().await;
        db.record_session("alice", "token-1").await.unwrap();
        db.record_session("alice", "token-2").await.unwrap();
        db.record_session("bob", "token-3").await.unwrap();

        let sessions = db.sessions_for("alice").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_token, "token-1");
        assert_eq!(sessions[1].session_token, "token-2");
    }

    #[tokio::test]
    async fn test_session_token_is_unique() {
        let db = database().await;
        db.record_session("alice", "same").await.unwrap();
        assert!(db.record_session("bob", "same").await.is_err());
    }

    #[tokio::test]
    async fn test_random_numbers_newest_first() {
        let db = database().await;
        db.record_random_number("2026-01-01T00:00:00+00:00", 7)
            .await
            .unwrap();
        db.record_random_number("2026-01-01T00:00:01+00:00", 42)
            .await
            .unwrap();

        let entries = db.recent_random_numbers(10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].random_number, 42);
        assert_eq!(entries[1].random_number, 7);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = database().await;
        assert!(db.run_migrations().await.is_ok());
    }
}
