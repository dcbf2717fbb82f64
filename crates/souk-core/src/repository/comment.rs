//! Comment repository trait definition.

use souk_types::comment::{Comment, CommentId};
use souk_types::error::RepositoryError;
use souk_types::item::ItemId;

/// Repository trait for comment persistence.
pub trait CommentRepository: Send + Sync {
    fn create(
        &self,
        comment: &Comment,
    ) -> impl std::future::Future<Output = Result<Comment, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &CommentId,
    ) -> impl std::future::Future<Output = Result<Option<Comment>, RepositoryError>> + Send;

    /// All comments on an item, oldest first.
    fn list_by_item(
        &self,
        item: &ItemId,
    ) -> impl std::future::Future<Output = Result<Vec<Comment>, RepositoryError>> + Send;

    fn delete(
        &self,
        id: &CommentId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
