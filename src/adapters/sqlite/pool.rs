//! Connection pool and schema setup.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Tables used by the repositories in this module, in dependency order.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id          TEXT PRIMARY KEY,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pdf_metadata (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       TEXT NOT NULL,
        filename      TEXT NOT NULL,
        file_path     TEXT NOT NULL,
        content_type  TEXT NOT NULL,
        file_size     INTEGER NOT NULL,
        checksum      TEXT NOT NULL,
        upload_date   TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_pdf_metadata_user ON pdf_metadata (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS pdf_content (
        pdf_id        INTEGER PRIMARY KEY REFERENCES pdf_metadata (id) ON DELETE CASCADE,
        text_content  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS threads (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL,
        pdf_id      INTEGER NOT NULL REFERENCES pdf_metadata (id),
        created_at  TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_threads_user ON threads (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS thread_messages (
        thread_id   TEXT NOT NULL REFERENCES threads (id) ON DELETE CASCADE,
        sequence    INTEGER NOT NULL,
        role        TEXT NOT NULL,
        content     TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        PRIMARY KEY (thread_id, sequence)
    )
    "#,
];

/// Opens the SQLite database described by `config`, creating the file and
/// schema when missing.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await?;

    initialize_schema(&pool).await?;

    tracing::info!(url = %config.url, "SQLite database ready");
    Ok(pool)
}

/// Creates any missing tables and indexes.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}
