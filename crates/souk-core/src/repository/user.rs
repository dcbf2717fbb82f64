//! User repository trait definition.

use souk_types::error::RepositoryError;
use souk_types::item::ItemId;
use souk_types::user::{User, UserId};

/// Repository trait for user persistence plus the two id-to-id relation
/// sets hanging off a user (`following`, `favorites`).
///
/// Implementations live in souk-infra (e.g., SqliteUserRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// Uniqueness of `username` and `email` is enforced by the store at
/// commit time; violations surface as `RepositoryError::Conflict`
/// naming the field.
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Conflicts on username or email.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Update an existing user. Conflicts on username or email change.
    fn update(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Add `target` to `follower`'s following set. Returns `true` if the
    /// relation was newly added, `false` if it already existed (no-op).
    fn follow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove `target` from `follower`'s following set. Returns `true`
    /// if a relation was actually removed.
    fn unfollow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// The ids of every item in this user's favorites set.
    fn favorites_of(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ItemId>, RepositoryError>> + Send;
}
