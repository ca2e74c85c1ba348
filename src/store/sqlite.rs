//! `SQLite` implementation of [`BookStore`].

use async_trait::async_trait;
use tracing::instrument;

use crate::db::Database;

use super::error::is_unique_violation;
use super::{BookCopyRow, BookInfoRow, BookStore, NewBookCopy, Result, StoreError, TagRow};

/// Book store backed by the crate's `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteBookStore {
    db: Database,
}

impl SqliteBookStore {
    /// Creates a store over an open database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the underlying database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Counts the copies registered for `isbn`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count_book_copies(&self, isbn: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM book WHERE isbn = ?")
            .bind(isbn)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    #[instrument(skip(self))]
    async fn query_book_info_by_isbn(&self, isbn: &str) -> Result<Option<BookInfoRow>> {
        let row = sqlx::query_as::<_, BookInfoRow>(
            r"SELECT isbn, title, price, author, publisher, series, publish_date,
                     binding, format, pages, word_count, content_intro, author_intro, menu
              FROM book_info
              WHERE isbn = ?",
        )
        .bind(isbn)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row)
    }

    #[instrument(skip(self, row), fields(isbn = %row.isbn))]
    async fn upsert_book_info(&self, row: &BookInfoRow) -> Result<()> {
        sqlx::query(
            r"INSERT INTO book_info (
                isbn,
                title,
                price,
                author,
                publisher,
                series,
                publish_date,
                binding,
                format,
                pages,
                word_count,
                content_intro,
                author_intro,
                menu
              )
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              ON CONFLICT(isbn) DO UPDATE SET
                title = excluded.title,
                price = excluded.price,
                author = excluded.author,
                publisher = excluded.publisher,
                series = excluded.series,
                publish_date = excluded.publish_date,
                binding = excluded.binding,
                format = excluded.format,
                pages = excluded.pages,
                word_count = excluded.word_count,
                content_intro = excluded.content_intro,
                author_intro = excluded.author_intro,
                menu = excluded.menu,
                updated_at = datetime('now')",
        )
        .bind(&row.isbn)
        .bind(&row.title)
        .bind(row.price)
        .bind(&row.author)
        .bind(&row.publisher)
        .bind(&row.series)
        .bind(row.publish_date)
        .bind(&row.binding)
        .bind(&row.format)
        .bind(row.pages)
        .bind(row.word_count)
        .bind(&row.content_intro)
        .bind(&row.author_intro)
        .bind(&row.menu)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_tags_for_isbn(&self, isbn: &str) -> Result<Vec<TagRow>> {
        let tags = sqlx::query_as::<_, TagRow>(
            r"SELECT tag.id, tag.tag
              FROM book_info_tag
              JOIN tag ON tag.id = book_info_tag.tag_id
              WHERE book_info_tag.isbn = ?
              ORDER BY book_info_tag.rowid",
        )
        .bind(isbn)
        .fetch_all(self.db.pool())
        .await?;
        Ok(tags)
    }

    #[instrument(skip(self, tag), fields(tag = %tag.tag))]
    async fn remove_tag_association(&self, isbn: &str, tag: &TagRow) -> Result<()> {
        sqlx::query("DELETE FROM book_info_tag WHERE isbn = ? AND tag_id = ?")
            .bind(isbn)
            .bind(tag.id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn insert_tag(&self, label: &str) -> Result<TagRow> {
        sqlx::query_as::<_, TagRow>("INSERT INTO tag (tag) VALUES (?) RETURNING id, tag")
            .bind(label)
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateLabel(label.to_string())
                } else {
                    StoreError::from(e)
                }
            })
    }

    #[instrument(skip(self))]
    async fn query_tag_by_label(&self, label: &str) -> Result<Option<TagRow>> {
        let tag = sqlx::query_as::<_, TagRow>("SELECT id, tag FROM tag WHERE tag = ?")
            .bind(label)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(tag)
    }

    #[instrument(skip(self, tag), fields(tag = %tag.tag))]
    async fn add_tag_association(&self, isbn: &str, tag: &TagRow) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO book_info_tag (isbn, tag_id) VALUES (?, ?)")
            .bind(isbn)
            .bind(tag.id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_book_copy_by_unique_code(
        &self,
        unique_code: &str,
    ) -> Result<Option<BookCopyRow>> {
        let copy = sqlx::query_as::<_, BookCopyRow>(
            "SELECT id, isbn, volume, unique_code FROM book WHERE unique_code = ?",
        )
        .bind(unique_code)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(copy)
    }

    #[instrument(skip(self, copy), fields(isbn = %copy.isbn, unique_code = %copy.unique_code))]
    async fn insert_book_copy(&self, copy: &NewBookCopy<'_>) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO book (isbn, volume, unique_code) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(copy.isbn)
        .bind(copy.volume)
        .bind(copy.unique_code)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey(copy.unique_code.to_string())
            } else {
                StoreError::from(e)
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::StoreDbErrorKind;
    use chrono::NaiveDate;

    async fn store() -> SqliteBookStore {
        SqliteBookStore::new(Database::new_in_memory().await.unwrap())
    }

    fn row(isbn: &str, title: &str) -> BookInfoRow {
        BookInfoRow {
            isbn: isbn.to_string(),
            title: Some(title.to_string()),
            price: Some(3980),
            publish_date: NaiveDate::from_ymd_opt(2013, 1, 1),
            ..BookInfoRow::default()
        }
    }

    #[tokio::test]
    async fn test_query_book_info_missing_returns_none() {
        let store = store().await;
        assert!(store.query_book_info_by_isbn("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_book_info_inserts_then_updates_in_place() {
        let store = store().await;
        store.upsert_book_info(&row("1", "First")).await.unwrap();
        store.upsert_book_info(&row("1", "Second")).await.unwrap();

        let stored = store.query_book_info_by_isbn("1").await.unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("Second"));
        assert_eq!(stored.publish_date, NaiveDate::from_ymd_opt(2013, 1, 1));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_info")
            .fetch_one(store.database().pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_insert_tag_duplicate_label() {
        let store = store().await;
        let first = store.insert_tag("fiction").await.unwrap();
        assert_eq!(first.tag, "fiction");

        let err = store.insert_tag("fiction").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateLabel(label) if label == "fiction"));

        let found = store.query_tag_by_label("fiction").await.unwrap().unwrap();
        assert_eq!(found, first);
    }

    #[tokio::test]
    async fn test_tag_associations_keep_insertion_order_and_ignore_repeats() {
        let store = store().await;
        store.upsert_book_info(&row("1", "Book")).await.unwrap();
        let mystery = store.insert_tag("mystery").await.unwrap();
        let fiction = store.insert_tag("fiction").await.unwrap();

        store.add_tag_association("1", &fiction).await.unwrap();
        store.add_tag_association("1", &mystery).await.unwrap();
        store.add_tag_association("1", &fiction).await.unwrap();

        let tags: Vec<_> = store
            .query_tags_for_isbn("1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.tag)
            .collect();
        assert_eq!(tags, vec!["fiction", "mystery"]);

        store.remove_tag_association("1", &fiction).await.unwrap();
        let tags = store.query_tags_for_isbn("1").await.unwrap();
        assert_eq!(tags, vec![mystery]);
        assert!(store.query_tag_by_label("fiction").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_book_copy_and_query_by_unique_code() {
        let store = store().await;
        store.upsert_book_info(&row("1", "Book")).await.unwrap();

        let copy = NewBookCopy {
            isbn: "1",
            volume: 2,
            unique_code: "A-001",
        };
        let id = store.insert_book_copy(&copy).await.unwrap();

        let found = store
            .query_book_copy_by_unique_code("A-001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.volume, 2);
        assert_eq!(store.count_book_copies("1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_book_copy_duplicate_unique_code() {
        let store = store().await;
        store.upsert_book_info(&row("1", "Book")).await.unwrap();
        let copy = NewBookCopy {
            isbn: "1",
            volume: 1,
            unique_code: "A-001",
        };
        store.insert_book_copy(&copy).await.unwrap();

        let err = store.insert_book_copy(&copy).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(code) if code == "A-001"));
    }

    #[tokio::test]
    async fn test_insert_book_copy_unknown_isbn_is_constraint_violation() {
        let store = store().await;
        let err = store
            .insert_book_copy(&NewBookCopy {
                isbn: "missing",
                volume: 1,
                unique_code: "A-002",
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.database_kind(),
            Some(StoreDbErrorKind::ConstraintViolation)
        );
    }
}
