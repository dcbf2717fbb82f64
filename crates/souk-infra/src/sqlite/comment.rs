//! SQLite comment repository implementation.

use sqlx::Row;

use souk_core::repository::comment::CommentRepository;
use souk_types::comment::{Comment, CommentId};
use souk_types::error::RepositoryError;
use souk_types::item::ItemId;
use souk_types::user::UserId;

use super::pool::{DatabasePool, map_db_err, with_read_retry};
use super::user::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `CommentRepository`.
#[derive(Clone)]
pub struct SqliteCommentRepository {
    pool: DatabasePool,
}

impl SqliteCommentRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Result<Comment, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let item_id: String = row
        .try_get("item_id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let author_id: String = row
        .try_get("author_id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let body: String = row
        .try_get("body")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Comment {
        id: id
            .parse::<CommentId>()
            .map_err(|e| RepositoryError::Query(format!("invalid comment id: {e}")))?,
        item_id: item_id
            .parse::<ItemId>()
            .map_err(|e| RepositoryError::Query(format!("invalid item id: {e}")))?,
        author_id: author_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid author id: {e}")))?,
        body,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

impl CommentRepository for SqliteCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment, RepositoryError> {
        sqlx::query(
            "INSERT INTO comments (id, item_id, author_id, body, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(comment.id.to_string())
        .bind(comment.item_id.to_string())
        .bind(comment.author_id.to_string())
        .bind(&comment.body)
        .bind(format_datetime(&comment.created_at))
        .bind(format_datetime(&comment.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_db_err)?;

        Ok(comment.clone())
    }

    async fn get_by_id(&self, id: &CommentId) -> Result<Option<Comment>, RepositoryError> {
        let row = with_read_retry(|| {
            sqlx::query("SELECT * FROM comments WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool.reader)
        })
        .await?;

        row.as_ref().map(row_to_comment).transpose()
    }

    async fn list_by_item(&self, item: &ItemId) -> Result<Vec<Comment>, RepositoryError> {
        let rows = with_read_retry(|| {
            sqlx::query(
                "SELECT * FROM comments WHERE item_id = ? ORDER BY created_at ASC, id ASC",
            )
            .bind(item.to_string())
            .fetch_all(&self.pool.reader)
        })
        .await?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn delete(&self, id: &CommentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
