//! Discussion graph: comments attached to items.
//!
//! Comments are immutable once created; the only mutation is deletion,
//! gated on authorship. The unchecked moderation path is surfaced only
//! through the maintenance CLI, never the HTTP router.

use souk_types::comment::{Comment, CommentId, CommentView};
use souk_types::error::DomainError;
use souk_types::identity::Identity;
use souk_types::user::Profile;

use crate::repository::comment::CommentRepository;
use crate::repository::item::ItemRepository;
use crate::repository::user::UserRepository;
use crate::service::gate::can_mutate;
use crate::service::storage_err;

/// Service owning the comment lifecycle.
pub struct DiscussionService<C: CommentRepository, I: ItemRepository, U: UserRepository> {
    comments: C,
    items: I,
    users: U,
}

impl<C: CommentRepository, I: ItemRepository, U: UserRepository> DiscussionService<C, I, U> {
    pub fn new(comments: C, items: I, users: U) -> Self {
        Self {
            comments,
            items,
            users,
        }
    }

    /// Add a comment to an existing item.
    pub async fn add_comment(
        &self,
        identity: &Identity,
        slug: &str,
        body: String,
    ) -> Result<Comment, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::validation("body", "body cannot be empty"));
        }

        let item = self
            .items
            .get_by_slug(slug)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("item"))?;

        let now = chrono::Utc::now();
        let comment = Comment {
            id: CommentId::new(),
            item_id: item.id,
            author_id: identity.user_id.clone(),
            body,
            created_at: now,
            updated_at: now,
        };

        self.comments.create(&comment).await.map_err(storage_err)
    }

    /// All comments on an item, oldest first, each enriched with the
    /// author profile as seen by the viewer.
    pub async fn list_comments(
        &self,
        slug: &str,
        viewer: Option<&Identity>,
    ) -> Result<Vec<CommentView>, DomainError> {
        let item = self
            .items
            .get_by_slug(slug)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("item"))?;

        let comments = self
            .comments
            .list_by_item(&item.id)
            .await
            .map_err(storage_err)?;

        let mut views = Vec::with_capacity(comments.len());
        for comment in &comments {
            let author = self
                .users
                .get_by_id(&comment.author_id)
                .await
                .map_err(storage_err)?
                .ok_or(DomainError::NotFound("user"))?;

            let following = match viewer {
                Some(viewer) => self
                    .users
                    .is_following(&viewer.user_id, &author.id)
                    .await
                    .map_err(storage_err)?,
                None => false,
            };

            views.push(CommentView::project(comment, Profile::project(&author, following)));
        }

        Ok(views)
    }

    /// Delete a comment. Only the author may do this through the
    /// authenticated surface.
    pub async fn delete_comment(
        &self,
        identity: &Identity,
        comment_id: &CommentId,
    ) -> Result<(), DomainError> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("comment"))?;

        if !can_mutate(Some(identity), &comment.author_id, false) {
            return Err(DomainError::Forbidden);
        }

        self.comments.delete(comment_id).await.map_err(storage_err)
    }

    /// Moderation bypass: delete any comment without an ownership check.
    ///
    /// Exposed only through the maintenance CLI; the deployment
    /// boundary, not this service, gates who can reach it.
    pub async fn delete_comment_unchecked(
        &self,
        comment_id: &CommentId,
    ) -> Result<(), DomainError> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("comment"))?;

        tracing::warn!(comment_id = %comment.id, "moderation delete");
        self.comments.delete(comment_id).await.map_err(storage_err)
    }
}
