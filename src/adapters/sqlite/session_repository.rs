//! SQLite implementations of UserRepository and ThreadRepository.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::domain::foundation::{DocumentId, ThreadId, Timestamp, UserId};
use crate::domain::thread::Thread;
use crate::domain::user::User;
use crate::ports::{RepositoryError, ThreadRepository, UserRepository};

/// SQLite implementation of UserRepository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Creates a new SqliteUserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query("INSERT OR IGNORE INTO users (id, created_at) VALUES (?, ?)")
            .bind(user.id.as_str())
            .bind(user.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::database)?;

        Ok(())
    }

    async fn exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::database)?;

        Ok(result.0 > 0)
    }
}

/// SQLite implementation of ThreadRepository.
#[derive(Clone)]
pub struct SqliteThreadRepository {
    pool: SqlitePool,
}

impl SqliteThreadRepository {
    /// Creates a new SqliteThreadRepository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadRepository for SqliteThreadRepository {
    async fn create(&self, thread: &Thread) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO threads (id, user_id, pdf_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(thread.id.as_str())
            .bind(thread.owner.as_str())
            .bind(thread.document_id.as_i64())
            .bind(thread.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::database)?;

        Ok(())
    }

    async fn find(&self, id: &ThreadId) -> Result<Option<Thread>, RepositoryError> {
        let row = sqlx::query("SELECT id, user_id, pdf_id, created_at FROM threads WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::database)?;

        row.map(row_to_thread).transpose()
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Thread>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, pdf_id, created_at
            FROM threads
            WHERE user_id = ?
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::database)?;

        rows.into_iter().map(row_to_thread).collect()
    }
}

fn row_to_thread(row: SqliteRow) -> Result<Thread, RepositoryError> {
    let id: String = row.try_get("id").map_err(RepositoryError::database)?;
    let owner: String = row.try_get("user_id").map_err(RepositoryError::database)?;
    let created: String = row.try_get("created_at").map_err(RepositoryError::database)?;

    Ok(Thread {
        id: id
            .parse::<ThreadId>()
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
        owner: UserId::new(owner).map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
        document_id: DocumentId::new(row.try_get("pdf_id").map_err(RepositoryError::database)?),
        created_at: Timestamp::parse_rfc3339(&created)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::pool::test_support::temp_pool;
    use crate::adapters::sqlite::SqliteDocumentRepository;
    use crate::domain::document::NewDocument;
    use crate::ports::DocumentRepository;

    async fn seeded_document(pool: &SqlitePool, owner: &UserId) -> DocumentId {
        let repo = SqliteDocumentRepository::new(pool.clone());
        let doc = NewDocument {
            owner: owner.clone(),
            filename: "doc.pdf".to_string(),
            file_path: "uploads/doc.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            file_size: 10,
            checksum: "c".to_string(),
            uploaded_at: Timestamp::now(),
        };
        repo.insert(doc, Some("text")).await.unwrap().id
    }

    #[tokio::test]
    async fn user_create_is_idempotent() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteUserRepository::new(pool);
        let user = User::register();

        assert!(!repo.exists(&user.id).await.unwrap());
        repo.create(&user).await.unwrap();
        repo.create(&user).await.unwrap();
        assert!(repo.exists(&user.id).await.unwrap());
    }

    #[tokio::test]
    async fn thread_round_trips() {
        let (pool, _dir) = temp_pool().await;
        let owner = UserId::new("owner").unwrap();
        let doc = seeded_document(&pool, &owner).await;
        let repo = SqliteThreadRepository::new(pool);

        let thread = Thread::start(owner.clone(), doc);
        repo.create(&thread).await.unwrap();

        let found = repo.find(&thread.id).await.unwrap().unwrap();
        assert_eq!(found.id, thread.id);
        assert_eq!(found.owner, owner);
        assert_eq!(found.document_id, doc);
    }

    #[tokio::test]
    async fn thread_requires_existing_document() {
        let (pool, _dir) = temp_pool().await;
        let repo = SqliteThreadRepository::new(pool);

        let thread = Thread::start(UserId::new("u").unwrap(), DocumentId::new(77));
        let result = repo.create(&thread).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn list_threads_is_scoped_to_owner() {
        let (pool, _dir) = temp_pool().await;
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();
        let doc = seeded_document(&pool, &alice).await;
        let repo = SqliteThreadRepository::new(pool);

        repo.create(&Thread::start(alice.clone(), doc)).await.unwrap();
        repo.create(&Thread::start(alice.clone(), doc)).await.unwrap();
        repo.create(&Thread::start(bob.clone(), doc)).await.unwrap();

        assert_eq!(repo.list_for_owner(&alice).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_owner(&bob).await.unwrap().len(), 1);
    }
}
