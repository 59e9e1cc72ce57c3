//! SQLite implementation of HistoryStore.
//!
//! Messages are keyed by `(thread_id, sequence)`; sequences start at 1 and
//! are assigned by the insert itself inside the appending transaction.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::domain::conversation::{ChatMessage, MessageRole, StoredMessage};
use crate::domain::foundation::{ThreadId, Timestamp};
use crate::ports::{HistoryPage, HistoryStore, RepositoryError};

/// SQLite implementation of HistoryStore.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Creates a new SqliteHistoryStore.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(
        &self,
        thread_id: &ThreadId,
        messages: &[ChatMessage],
    ) -> Result<(), RepositoryError> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::database)?;

        // Each insert derives its own sequence so the first statement in the
        // transaction is a write and takes the lock before reading MAX.
        let created_at = Timestamp::now().to_rfc3339();
        for message in messages {
            sqlx::query(
                r#"
                INSERT INTO thread_messages (thread_id, sequence, role, content, created_at)
                SELECT ?, COALESCE(MAX(sequence), 0) + 1, ?, ?, ?
                FROM thread_messages
                WHERE thread_id = ?
                "#,
            )
            .bind(thread_id.as_str())
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(&created_at)
            .bind(thread_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::database)?;
        }

        tx.commit().await.map_err(RepositoryError::database)
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT thread_id, sequence, role, content, created_at
            FROM thread_messages
            WHERE thread_id = ?
            ORDER BY sequence
            "#,
        )
        .bind(thread_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::database)?;

        rows.into_iter()
            .map(|row| row_to_message(row).map(|stored| stored.message))
            .collect()
    }

    async fn page(
        &self,
        thread_id: &ThreadId,
        offset: u32,
        limit: u32,
    ) -> Result<HistoryPage, RepositoryError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM thread_messages WHERE thread_id = ?")
                .bind(thread_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(RepositoryError::database)?;

        let rows = sqlx::query(
            r#"
            SELECT thread_id, sequence, role, content, created_at
            FROM thread_messages
            WHERE thread_id = ?
            ORDER BY sequence
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(thread_id.as_str())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::database)?;

        let messages = rows
            .into_iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HistoryPage {
            messages,
            total: total.max(0) as u64,
        })
    }
}

fn row_to_message(row: SqliteRow) -> Result<StoredMessage, RepositoryError> {
    let thread_id: String = row.try_get("thread_id").map_err(RepositoryError::database)?;
    let role: String = row.try_get("role").map_err(RepositoryError::database)?;
    let created: String = row.try_get("created_at").map_err(RepositoryError::database)?;

    let role = MessageRole::parse(&role)
        .ok_or_else(|| RepositoryError::Corrupt(format!("unknown message role: {}", role)))?;

    Ok(StoredMessage {
        thread_id: thread_id
            .parse::<ThreadId>()
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
        sequence: row.try_get("sequence").map_err(RepositoryError::database)?,
        message: ChatMessage::new(
            role,
            row.try_get::<String, _>("content")
                .map_err(RepositoryError::database)?,
        ),
        created_at: Timestamp::parse_rfc3339(&created)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
    })
}
