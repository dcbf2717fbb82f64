//! SQLite item repository implementation.
//!
//! Implements `ItemRepository` from `souk-core` using sqlx with split
//! read/write pools. Tag lists are stored as JSON text and filtered
//! with SQLite's built-in `json_each`. Favorite/unfavorite pair the
//! membership row and the `favorites_count` column inside a single
//! transaction on the serialized writer pool, so the counter always
//! reflects the true cardinality of favoriting users.

use sqlx::Row;

use souk_core::repository::item::{ItemFilter, ItemRepository};
use souk_types::error::RepositoryError;
use souk_types::item::{Item, ItemId};
use souk_types::user::UserId;

use super::pool::{DatabasePool, map_db_err, with_read_retry};
use super::user::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ItemRepository`.
#[derive(Clone)]
pub struct SqliteItemRepository {
    pool: DatabasePool,
}

impl SqliteItemRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to the domain Item.
struct ItemRow {
    id: String,
    slug: String,
    title: String,
    description: String,
    image: Option<String>,
    tags: String,
    seller_id: String,
    favorites_count: i64,
    created_at: String,
    updated_at: String,
}

impl ItemRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            image: row.try_get("image")?,
            tags: row.try_get("tags")?,
            seller_id: row.try_get("seller_id")?,
            favorites_count: row.try_get("favorites_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_item(self) -> Result<Item, RepositoryError> {
        let id = self
            .id
            .parse::<ItemId>()
            .map_err(|e| RepositoryError::Query(format!("invalid item id: {e}")))?;
        let seller_id = self
            .seller_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid seller id: {e}")))?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| RepositoryError::Query(format!("invalid tags JSON: {e}")))?;

        Ok(Item {
            id,
            slug: self.slug,
            title: self.title,
            description: self.description,
            image: self.image,
            tags,
            seller_id,
            favorites_count: self.favorites_count,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// WHERE clause plus bind values for a filter. Conditions always use
/// placeholders; only LIMIT/OFFSET (plain integers) are formatted in.
fn filter_conditions(filter: &ItemFilter) -> (Vec<&'static str>, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(tag) = &filter.tag {
        conditions
            .push("EXISTS (SELECT 1 FROM json_each(items.tags) WHERE json_each.value = ?)");
        binds.push(tag.clone());
    }
    if let Some(seller) = &filter.seller {
        conditions.push("items.seller_id IN (SELECT id FROM users WHERE username = ?)");
        binds.push(seller.clone());
    }
    if let Some(favorited_by) = &filter.favorited_by {
        conditions.push(
            "items.id IN (SELECT f.item_id FROM favorites f JOIN users u ON u.id = f.user_id WHERE u.username = ?)",
        );
        binds.push(favorited_by.clone());
    }
    if let Some(followed_by) = &filter.followed_by {
        conditions
            .push("items.seller_id IN (SELECT followed_id FROM follows WHERE follower_id = ?)");
        binds.push(followed_by.to_string());
    }

    (conditions, binds)
}

impl ItemRepository for SqliteItemRepository {
    async fn create(&self, item: &Item) -> Result<Item, RepositoryError> {
        let tags_json = serde_json::to_string(&item.tags)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO items (id, slug, title, description, image, tags, seller_id, favorites_count, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id.to_string())
        .bind(&item.slug)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image)
        .bind(&tags_json)
        .bind(item.seller_id.to_string())
        .bind(item.favorites_count)
        .bind(format_datetime(&item.created_at))
        .bind(format_datetime(&item.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(item.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict("slug".to_string()))
            }
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Item>, RepositoryError> {
        let row = with_read_retry(|| {
            sqlx::query("SELECT * FROM items WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&self.pool.reader)
        })
        .await?;

        row.map(|row| {
            ItemRow::from_row(&row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_item()
        })
        .transpose()
    }

    async fn list(&self, filter: &ItemFilter) -> Result<(Vec<Item>, i64), RepositoryError> {
        let (conditions, binds) = filter_conditions(filter);

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM items{where_clause}");
        let total: i64 = with_read_retry(|| {
            let mut query = sqlx::query_scalar(&count_sql);
            for bind in &binds {
                query = query.bind(bind);
            }
            query.fetch_one(&self.pool.reader)
        })
        .await?;

        // Newest first; id (time-sortable UUID v7) breaks same-instant ties.
        let mut sql =
            format!("SELECT * FROM items{where_clause} ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = filter.offset {
            if filter.limit.is_none() {
                sql.push_str(" LIMIT -1");
            }
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = with_read_retry(|| {
            let mut query = sqlx::query(&sql);
            for bind in &binds {
                query = query.bind(bind);
            }
            query.fetch_all(&self.pool.reader)
        })
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let item_row =
                ItemRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            items.push(item_row.into_item()?);
        }

        Ok((items, total))
    }

    async fn update(&self, item: &Item) -> Result<Item, RepositoryError> {
        let tags_json = serde_json::to_string(&item.tags)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE items SET title = ?, description = ?, image = ?, tags = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image)
        .bind(&tags_json)
        .bind(format_datetime(&item.updated_at))
        .bind(item.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(item.clone())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), RepositoryError> {
        // Comments and favorite rows go with it via ON DELETE CASCADE,
        // all inside this single statement.
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn favorite(&self, user: &UserId, item: &ItemId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_db_err)?;

        let inserted =
            sqlx::query("INSERT INTO favorites (user_id, item_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
                .bind(user.to_string())
                .bind(item.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;

        let added = inserted.rows_affected() > 0;
        if added {
            // Counter moves only when the membership row actually changed.
            sqlx::query("UPDATE items SET favorites_count = favorites_count + 1 WHERE id = ?")
                .bind(item.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)?;
        Ok(added)
    }

    async fn unfavorite(&self, user: &UserId, item: &ItemId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_db_err)?;

        let deleted = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND item_id = ?")
            .bind(user.to_string())
            .bind(item.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            sqlx::query("UPDATE items SET favorites_count = favorites_count - 1 WHERE id = ?")
                .bind(item.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)?;
        Ok(removed)
    }

    async fn is_favorited(&self, user: &UserId, item: &ItemId) -> Result<bool, RepositoryError> {
        let exists: i64 = with_read_retry(|| {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ? AND item_id = ?)",
            )
            .bind(user.to_string())
            .bind(item.to_string())
            .fetch_one(&self.pool.reader)
        })
        .await?;

        Ok(exists != 0)
    }
}
