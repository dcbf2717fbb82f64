//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `souk-core` using sqlx with split
//! read/write pools. Username and email uniqueness is enforced by the
//! schema; violations are translated into field-named conflicts.

use chrono::{DateTime, Utc};
use sqlx::Row;

use souk_core::repository::user::UserRepository;
use souk_types::error::RepositoryError;
use souk_types::identity::Role;
use souk_types::item::ItemId;
use souk_types::user::{User, UserId};

use super::pool::{DatabasePool, map_db_err, with_read_retry};

/// SQLite-backed implementation of `UserRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to the domain User.
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    password_salt: String,
    bio: Option<String>,
    image: Option<String>,
    role: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            password_salt: row.try_get("password_salt")?,
            bio: row.try_get("bio")?,
            image: row.try_get("image")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = self
            .id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let role: Role = self.role.parse().map_err(RepositoryError::Query)?;

        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            password_salt: self.password_salt,
            bio: self.bio,
            image: self.image,
            role,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Translate a UNIQUE violation on the users table into a conflict
/// naming the offending field.
fn user_conflict(message: &str) -> Option<RepositoryError> {
    if !message.contains("UNIQUE") {
        return None;
    }
    let field = if message.contains("users.email") {
        "email"
    } else {
        "username"
    };
    Some(RepositoryError::Conflict(field.to_string()))
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, password_salt, bio, image, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(&user.bio)
        .bind(&user.image)
        .bind(user.role.to_string())
        .bind(format_datetime(&user.created_at))
        .bind(format_datetime(&user.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) => match user_conflict(db_err.message()) {
                Some(conflict) => Err(conflict),
                None => Err(map_db_err(sqlx::Error::Database(db_err))),
            },
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = with_read_retry(|| {
            sqlx::query("SELECT * FROM users WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool.reader)
        })
        .await?;

        row.map(|row| {
            UserRow::from_row(&row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_user()
        })
        .transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = with_read_retry(|| {
            sqlx::query("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool.reader)
        })
        .await?;

        row.map(|row| {
            UserRow::from_row(&row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_user()
        })
        .transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = with_read_retry(|| {
            sqlx::query("SELECT * FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool.reader)
        })
        .await?;

        row.map(|row| {
            UserRow::from_row(&row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_user()
        })
        .transpose()
    }

    async fn update(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, password_hash = ?, password_salt = ?, bio = ?, image = ?, role = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(&user.bio)
        .bind(&user.image)
        .bind(user.role.to_string())
        .bind(format_datetime(&user.updated_at))
        .bind(user.id.to_string())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(RepositoryError::NotFound),
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) => match user_conflict(db_err.message()) {
                Some(conflict) => Err(conflict),
                None => Err(map_db_err(sqlx::Error::Database(db_err))),
            },
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn follow(&self, follower: &UserId, target: &UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followed_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(follower.to_string())
        .bind(target.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(map_db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn unfollow(&self, follower: &UserId, target: &UserId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followed_id = ?")
                .bind(follower.to_string())
                .bind(target.to_string())
                .execute(&self.pool.writer)
                .await
                .map_err(map_db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, RepositoryError> {
        let exists: i64 = with_read_retry(|| {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND followed_id = ?)",
            )
            .bind(follower.to_string())
            .bind(target.to_string())
            .fetch_one(&self.pool.reader)
        })
        .await?;

        Ok(exists != 0)
    }

    async fn favorites_of(&self, user: &UserId) -> Result<Vec<ItemId>, RepositoryError> {
        let ids: Vec<String> = with_read_retry(|| {
            sqlx::query_scalar("SELECT item_id FROM favorites WHERE user_id = ?")
                .bind(user.to_string())
                .fetch_all(&self.pool.reader)
        })
        .await?;

        ids.into_iter()
            .map(|id| {
                id.parse::<ItemId>()
                    .map_err(|e| RepositoryError::Query(format!("invalid item id: {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    pub(crate) fn make_user(username: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "00".repeat(64),
            password_salt: "11".repeat(16),
            bio: None,
            image: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookups() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("alice");

        repo.create(&user).await.unwrap();

        let by_id = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.role, Role::User);

        let by_name = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_email = repo.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_conflict_names_field() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create(&make_user("alice")).await.unwrap();

        let mut dup = make_user("alice");
        dup.email = "other@example.com".to_string();
        let err = repo.create(&dup).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(f) if f == "username"));
    }

    #[tokio::test]
    async fn test_email_conflict_names_field() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create(&make_user("alice")).await.unwrap();

        let mut dup = make_user("bob");
        dup.email = "alice@example.com".to_string();
        let err = repo.create(&dup).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(f) if f == "email"));
    }

    #[tokio::test]
    async fn test_username_is_case_sensitive() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create(&make_user("alice")).await.unwrap();

        // Different case is a different handle, not a conflict.
        repo.create(&make_user("Alice")).await.unwrap();
        assert!(repo.get_by_username("Alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_conflicts_on_taken_email() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create(&make_user("alice")).await.unwrap();
        let mut bob = make_user("bob");
        repo.create(&bob).await.unwrap();

        bob.email = "alice@example.com".to_string();
        let err = repo.update(&bob).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(f) if f == "email"));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let err = repo.update(&make_user("ghost")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_follow_round_trip_idempotent() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let alice = make_user("alice");
        let bob = make_user("bob");
        repo.create(&alice).await.unwrap();
        repo.create(&bob).await.unwrap();

        assert!(!repo.is_following(&alice.id, &bob.id).await.unwrap());

        assert!(repo.follow(&alice.id, &bob.id).await.unwrap());
        assert!(repo.is_following(&alice.id, &bob.id).await.unwrap());
        // Directed relation: the reverse edge does not exist.
        assert!(!repo.is_following(&bob.id, &alice.id).await.unwrap());

        // Redundant follow is a no-op.
        assert!(!repo.follow(&alice.id, &bob.id).await.unwrap());

        assert!(repo.unfollow(&alice.id, &bob.id).await.unwrap());
        assert!(!repo.is_following(&alice.id, &bob.id).await.unwrap());

        // Redundant unfollow is a no-op.
        assert!(!repo.unfollow(&alice.id, &bob.id).await.unwrap());
    }
}
