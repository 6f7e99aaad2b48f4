//! Conversation history collaborator.
//!
//! The pipeline produces `ConversationTurn`s and hands them here; it
//! never reads them back. Turns are keyed by a `%Y-%m-%d` day string
//! plus the session id of the process run that produced them.

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::core::errors::HistoryError;
use crate::rag::ConversationTurn;

#[derive(Debug, Clone)]
pub struct RecordedTurn {
    pub id: i64,
    pub day: String,
    pub question: String,
    pub answer: String,
    pub used_context: bool,
    pub created_at: String,
}

#[derive(Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub async fn new(db_path: PathBuf) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| HistoryError::db(format!("failed to open history db: {}", e)))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS turns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                day TEXT NOT NULL,
                session_id TEXT NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                used_context INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(HistoryError::db)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_turns_day ON turns(day)")
            .execute(&pool)
            .await
            .map_err(HistoryError::db)?;

        Ok(Self { pool })
    }

    /// Record one turn under the given day key.
    pub async fn record(
        &self,
        day: &str,
        session_id: &str,
        turn: &ConversationTurn,
    ) -> Result<i64, HistoryError> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO turns (day, session_id, question, answer, used_context, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(day)
        .bind(session_id)
        .bind(&turn.question)
        .bind(&turn.answer)
        .bind(turn.used_context as i64)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(HistoryError::db)?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent turns for a day, oldest first, at most `limit`.
    pub async fn recent(&self, day: &str, limit: i64) -> Result<Vec<RecordedTurn>, HistoryError> {
        let rows = sqlx::query(
            "SELECT * FROM (
                SELECT id, day, question, answer, used_context, created_at
                FROM turns WHERE day = ? ORDER BY id DESC LIMIT ?
             ) ORDER BY id ASC",
        )
        .bind(day)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(HistoryError::db)?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in rows {
            turns.push(RecordedTurn {
                id: row.try_get::<i64, _>("id").unwrap_or_default(),
                day: row.try_get::<String, _>("day").unwrap_or_default(),
                question: row.try_get::<String, _>("question").unwrap_or_default(),
                answer: row.try_get::<String, _>("answer").unwrap_or_default(),
                used_context: row.try_get::<i64, _>("used_context").unwrap_or_default() != 0,
                created_at: row.try_get::<String, _>("created_at").unwrap_or_default(),
            });
        }
        Ok(turns)
    }

    /// Delete every turn recorded under a day key; returns how many went.
    pub async fn clear_day(&self, day: &str) -> Result<u64, HistoryError> {
        let result = sqlx::query("DELETE FROM turns WHERE day = ?")
            .bind(day)
            .execute(&self.pool)
            .await
            .map_err(HistoryError::db)?;
        Ok(result.rows_affected())
    }

    pub async fn turn_count(&self) -> Result<i64, HistoryError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM turns")
            .fetch_one(&self.pool)
            .await
            .map(|r| r.get(0))
            .map_err(HistoryError::db)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(question: &str, answer: &str) -> ConversationTurn {
        ConversationTurn {
            question: question.to_string(),
            answer: answer.to_string(),
            used_context: false,
        }
    }

    async fn store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn turns_are_recorded_and_listed_oldest_first() {
        let (_dir, store) = store().await;

        store
            .record("2024-05-01", "s1", &turn("q1", "a1"))
            .await
            .unwrap();
        store
            .record("2024-05-01", "s1", &turn("q2", "a2"))
            .await
            .unwrap();

        let turns = store.recent("2024-05-01", 10).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].question, "q1");
        assert_eq!(turns[1].question, "q2");
    }

    #[tokio::test]
    async fn recent_respects_the_limit_and_keeps_the_newest() {
        let (_dir, store) = store().await;
        for i in 0..5 {
            store
                .record("2024-05-01", "s1", &turn(&format!("q{}", i), "a"))
                .await
                .unwrap();
        }

        let turns = store.recent("2024-05-01", 2).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].question, "q3");
        assert_eq!(turns[1].question, "q4");
    }

    #[tokio::test]
    async fn days_are_isolated() {
        let (_dir, store) = store().await;
        store
            .record("2024-05-01", "s1", &turn("old", "a"))
            .await
            .unwrap();
        store
            .record("2024-05-02", "s1", &turn("new", "a"))
            .await
            .unwrap();

        let cleared = store.clear_day("2024-05-01").await.unwrap();
        assert_eq!(cleared, 1);
        assert_eq!(store.turn_count().await.unwrap(), 1);
        assert!(store.recent("2024-05-01", 10).await.unwrap().is_empty());
    }
}
