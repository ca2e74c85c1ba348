//! `SQLite` catalog database: pool, pragmas and embedded schema migrations.

use std::path::Path;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, instrument};

/// Pool size when the config file does not set `database.max_connections`.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// `PRAGMA busy_timeout` when the config file does not set `database.busy_timeout_ms`.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Errors opening the catalog database.
#[derive(Error, Debug)]
pub enum DbError {
    /// The database file could not be opened or configured.
    #[error("failed to open catalog database: {0}\n  Suggestion: Check the `--db` path or `database.path` in the config file")]
    Connection(#[from] sqlx::Error),

    /// The catalog schema could not be applied.
    #[error("failed to apply catalog schema: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pool tuning for file-backed databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// `PRAGMA busy_timeout` value in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Pooled handle to the book catalog.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the catalog at `db_path` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the file cannot be opened or migrated.
    pub async fn new(db_path: &Path) -> Result<Self, DbError> {
        Self::new_with_options(db_path, DatabaseOptions::default()).await
    }

    /// Opens (creating if needed) the catalog at `db_path` in WAL mode and
    /// applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(path = %db_path.display()))]
    pub async fn new_with_options(
        db_path: &Path,
        options: DatabaseOptions,
    ) -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query(&format!("PRAGMA busy_timeout={}", options.busy_timeout_ms))
            .execute(&pool)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        debug!(max_connections = options.max_connections, "catalog database ready");
        Ok(Self { pool })
    }

    /// Opens a private in-memory catalog on a single connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the schema cannot be applied.
    #[instrument]
    pub async fn new_in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for pooled connections to finish and closes them.
    #[instrument(skip(self))]
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_new_in_memory_succeeds() {
        let db = Database::new_in_memory().await;
        assert!(db.is_ok(), "Failed to create in-memory database");
    }

    #[tokio::test]
    async fn test_database_book_info_isbn_is_unique() {
        let db = Database::new_in_memory().await.unwrap();

        sqlx::query("INSERT INTO book_info (isbn) VALUES ('9787514847642')")
            .execute(db.pool())
            .await
            .unwrap();
        let duplicate = sqlx::query("INSERT INTO book_info (isbn) VALUES ('9787514847642')")
            .execute(db.pool())
            .await;

        assert!(duplicate.is_err(), "isbn should be unique");
    }

    #[tokio::test]
    async fn test_database_tag_label_is_unique() {
        let db = Database::new_in_memory().await.unwrap();

        sqlx::query("INSERT INTO tag (tag) VALUES ('fiction')")
            .execute(db.pool())
            .await
            .unwrap();
        let duplicate = sqlx::query("INSERT INTO tag (tag) VALUES ('fiction')")
            .execute(db.pool())
            .await;

        assert!(duplicate.is_err(), "tag label should be unique");
    }

    #[tokio::test]
    async fn test_database_book_unique_code_is_unique() {
        let db = Database::new_in_memory().await.unwrap();

        sqlx::query("INSERT INTO book_info (isbn) VALUES ('1')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO book (isbn, volume, unique_code) VALUES ('1', 1, 'A-1')")
            .execute(db.pool())
            .await
            .unwrap();
        let duplicate =
            sqlx::query("INSERT INTO book (isbn, volume, unique_code) VALUES ('1', 2, 'A-1')")
                .execute(db.pool())
                .await;

        assert!(duplicate.is_err(), "unique_code should be unique");
    }

    #[tokio::test]
    async fn test_database_with_tempfile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db = Database::new(&db_path).await;
        assert!(db.is_ok(), "Failed to create database at temp path");

        let db = db.unwrap();
        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_database_reopen_keeps_rows_after_close() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("books.db");

        let db = Database::new(&db_path).await.unwrap();
        sqlx::query("INSERT INTO book_info (isbn) VALUES ('1')")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        let reopened = Database::new(&db_path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_info")
            .fetch_one(reopened.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
