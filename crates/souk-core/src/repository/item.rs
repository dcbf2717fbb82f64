//! Item repository trait definition.

use souk_types::error::RepositoryError;
use souk_types::item::{Item, ItemId};
use souk_types::user::UserId;

/// Filter criteria for listing items. All filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Only items carrying this tag.
    pub tag: Option<String>,
    /// Only items sold by this username.
    pub seller: Option<String>,
    /// Only items favorited by this username.
    pub favorited_by: Option<String>,
    /// Only items whose seller is followed by this user (the feed).
    pub followed_by: Option<UserId>,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Number of results to skip (offset pagination).
    pub offset: Option<i64>,
}

/// Repository trait for item persistence.
///
/// Slug uniqueness is enforced by the store at commit time
/// (`RepositoryError::Conflict`); the favorite/unfavorite pair mutates
/// the membership row and `favorites_count` as one atomic unit.
pub trait ItemRepository: Send + Sync {
    /// Insert a new item. Conflicts on slug.
    fn create(
        &self,
        item: &Item,
    ) -> impl std::future::Future<Output = Result<Item, RepositoryError>> + Send;

    fn get_by_slug(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Item>, RepositoryError>> + Send;

    /// List items matching the filter, newest first, plus the total
    /// match count ignoring pagination.
    fn list(
        &self,
        filter: &ItemFilter,
    ) -> impl std::future::Future<Output = Result<(Vec<Item>, i64), RepositoryError>> + Send;

    fn update(
        &self,
        item: &Item,
    ) -> impl std::future::Future<Output = Result<Item, RepositoryError>> + Send;

    /// Delete an item. The store removes its comments and favorite rows
    /// in the same transaction.
    fn delete(
        &self,
        id: &ItemId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Add the item to the user's favorites and bump `favorites_count`,
    /// atomically. Returns `true` if newly favorited, `false` if it
    /// already was (no-op, counter untouched).
    fn favorite(
        &self,
        user: &UserId,
        item: &ItemId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Reverse of [`ItemRepository::favorite`], same atomicity contract.
    fn unfavorite(
        &self,
        user: &UserId,
        item: &ItemId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    fn is_favorited(
        &self,
        user: &UserId,
        item: &ItemId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
