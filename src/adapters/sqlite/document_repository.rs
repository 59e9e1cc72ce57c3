//! SQLite implementation of DocumentRepository.
//!
//! Metadata lives in `pdf_metadata`, extracted text in `pdf_content`.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::domain::document::{Document, NewDocument};
use crate::domain::foundation::{DocumentId, Timestamp, UserId};
use crate::ports::{DocumentRepository, RepositoryError};

/// SQLite implementation of DocumentRepository.
#[derive(Clone)]
pub struct SqliteDocumentRepository {
    pool: SqlitePool,
}

impl SqliteDocumentRepository {
    /// Creates a new SqliteDocumentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn insert(
        &self,
        document: NewDocument,
        text: Option<&str>,
    ) -> Result<Document, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::database)?;

        let result = sqlx::query(
            r#"
            INSERT INTO pdf_metadata (
                user_id, filename, file_path, content_type, file_size, checksum, upload_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document.owner.as_str())
        .bind(&document.filename)
        .bind(&document.file_path)
        .bind(&document.content_type)
        .bind(document.file_size)
        .bind(&document.checksum)
        .bind(document.uploaded_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::database)?;

        let id = DocumentId::new(result.last_insert_rowid());

        if let Some(text) = text {
            sqlx::query("INSERT INTO pdf_content (pdf_id, text_content) VALUES (?, ?)")
                .bind(id.as_i64())
                .bind(text)
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::database)?;
        }

        tx.commit().await.map_err(RepositoryError::database)?;

        Ok(document.with_id(id))
    }

    async fn find(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, filename, file_path, content_type, file_size, checksum, upload_date
            FROM pdf_metadata
            WHERE id = ?
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::database)?;

        row.map(row_to_document).transpose()
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, filename, file_path, content_type, file_size, checksum, upload_date
            FROM pdf_metadata
            WHERE user_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::database)?;

        rows.into_iter().map(row_to_document).collect()
    }

    async fn find_text(&self, id: DocumentId) -> Result<Option<String>, RepositoryError> {
        let text: Option<(String,)> =
            sqlx::query_as("SELECT text_content FROM pdf_content WHERE pdf_id = ?")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(RepositoryError::database)?;

        Ok(text.map(|(t,)| t))
    }

    async fn store_text(&self, id: DocumentId, text: &str) -> Result<(), RepositoryError> {
        // Single write statement; an unknown document yields no row to insert.
        let result = sqlx::query(
            r#"
            INSERT INTO pdf_content (pdf_id, text_content)
            SELECT ?, ? WHERE EXISTS (SELECT 1 FROM pdf_metadata WHERE id = ?)
            ON CONFLICT (pdf_id) DO UPDATE SET text_content = excluded.text_content
            "#,
        )
        .bind(id.as_i64())
        .bind(text)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::database)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn row_to_document(row: SqliteRow) -> Result<Document, RepositoryError> {
    let owner: String = row.try_get("user_id").map_err(RepositoryError::database)?;
    let uploaded: String = row.try_get("upload_date").map_err(RepositoryError::database)?;

    Ok(Document {
        id: DocumentId::new(row.try_get("id").map_err(RepositoryError::database)?),
        owner: UserId::new(owner).map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
        filename: row.try_get("filename").map_err(RepositoryError::database)?,
        file_path: row.try_get("file_path").map_err(RepositoryError::database)?,
        content_type: row.try_get("content_type").map_err(RepositoryError::database)?,
        file_size: row.try_get("file_size").map_err(RepositoryError::database)?,
        checksum: row.try_get("checksum").map_err(RepositoryError::database)?,
        uploaded_at: Timestamp::parse_rfc3339(&uploaded)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
    })
}
