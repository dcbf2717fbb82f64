//! In-memory store for exercising the graph services without a database.
//!
//! Implements all three repository ports over mutex-guarded maps, with
//! the same contracts the SQLite layer honors: field-named conflicts,
//! idempotent relation writes, and the favorites membership/counter
//! pair applied together.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use souk_types::comment::{Comment, CommentId};
use souk_types::error::RepositoryError;
use souk_types::item::{Item, ItemId};
use souk_types::user::{User, UserId};

use crate::repository::comment::CommentRepository;
use crate::repository::item::{ItemFilter, ItemRepository};
use crate::repository::user::UserRepository;

#[derive(Default)]
struct Inner {
    users: Mutex<Vec<User>>,
    items: Mutex<Vec<Item>>,
    comments: Mutex<Vec<Comment>>,
    follows: Mutex<HashSet<(UserId, UserId)>>,
    favorites: Mutex<HashSet<(UserId, ItemId)>>,
}

/// Cloneable in-memory store; clones share state, like a database pool.
#[derive(Clone, Default)]
pub(crate) struct MemStore {
    inner: Arc<Inner>,
}

impl MemStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemStore {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.inner.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict("username".to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email".to_string()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.inner.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == *id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.inner.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.inner.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.inner.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepositoryError::Conflict("username".to_string()));
        }
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(RepositoryError::Conflict("email".to_string()));
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn follow(&self, follower: &UserId, target: &UserId) -> Result<bool, RepositoryError> {
        let mut follows = self.inner.follows.lock().unwrap();
        Ok(follows.insert((follower.clone(), target.clone())))
    }

    async fn unfollow(&self, follower: &UserId, target: &UserId) -> Result<bool, RepositoryError> {
        let mut follows = self.inner.follows.lock().unwrap();
        Ok(follows.remove(&(follower.clone(), target.clone())))
    }

    async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, RepositoryError> {
        let follows = self.inner.follows.lock().unwrap();
        Ok(follows.contains(&(follower.clone(), target.clone())))
    }

    async fn favorites_of(&self, user: &UserId) -> Result<Vec<ItemId>, RepositoryError> {
        let favorites = self.inner.favorites.lock().unwrap();
        Ok(favorites
            .iter()
            .filter(|(u, _)| u == user)
            .map(|(_, i)| i.clone())
            .collect())
    }
}

impl ItemRepository for MemStore {
    async fn create(&self, item: &Item) -> Result<Item, RepositoryError> {
        let mut items = self.inner.items.lock().unwrap();
        if items.iter().any(|i| i.slug == item.slug) {
            return Err(RepositoryError::Conflict("slug".to_string()));
        }
        items.push(item.clone());
        Ok(item.clone())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Item>, RepositoryError> {
        let items = self.inner.items.lock().unwrap();
        Ok(items.iter().find(|i| i.slug == slug).cloned())
    }

    async fn list(&self, filter: &ItemFilter) -> Result<(Vec<Item>, i64), RepositoryError> {
        let items = self.inner.items.lock().unwrap();
        let users = self.inner.users.lock().unwrap();
        let follows = self.inner.follows.lock().unwrap();
        let favorites = self.inner.favorites.lock().unwrap();

        let user_id_for = |username: &str| {
            users
                .iter()
                .find(|u| u.username == username)
                .map(|u| u.id.clone())
        };

        let mut matched: Vec<Item> = items
            .iter()
            .filter(|i| match &filter.tag {
                Some(tag) => i.tags.iter().any(|t| t == tag),
                None => true,
            })
            .filter(|i| match &filter.seller {
                Some(name) => user_id_for(name).is_some_and(|id| i.seller_id == id),
                None => true,
            })
            .filter(|i| match &filter.favorited_by {
                Some(name) => user_id_for(name)
                    .is_some_and(|id| favorites.contains(&(id, i.id.clone()))),
                None => true,
            })
            .filter(|i| match &filter.followed_by {
                Some(follower) => {
                    follows.contains(&(follower.clone(), i.seller_id.clone()))
                }
                None => true,
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matched.len() as i64;

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let page: Vec<Item> = match filter.limit {
            Some(limit) => matched
                .into_iter()
                .skip(offset)
                .take(limit.max(0) as usize)
                .collect(),
            None => matched.into_iter().skip(offset).collect(),
        };

        Ok((page, total))
    }

    async fn update(&self, item: &Item) -> Result<Item, RepositoryError> {
        let mut items = self.inner.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = item.clone();
        Ok(item.clone())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), RepositoryError> {
        let mut items = self.inner.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != *id);
        if items.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.inner
            .comments
            .lock()
            .unwrap()
            .retain(|c| c.item_id != *id);
        self.inner
            .favorites
            .lock()
            .unwrap()
            .retain(|(_, i)| i != id);
        Ok(())
    }

    async fn favorite(&self, user: &UserId, item: &ItemId) -> Result<bool, RepositoryError> {
        // Same lock order as `list` (items before favorites).
        let mut items = self.inner.items.lock().unwrap();
        let mut favorites = self.inner.favorites.lock().unwrap();
        let added = favorites.insert((user.clone(), item.clone()));
        if added {
            if let Some(i) = items.iter_mut().find(|i| i.id == *item) {
                i.favorites_count += 1;
            }
        }
        Ok(added)
    }

    async fn unfavorite(&self, user: &UserId, item: &ItemId) -> Result<bool, RepositoryError> {
        let mut items = self.inner.items.lock().unwrap();
        let mut favorites = self.inner.favorites.lock().unwrap();
        let removed = favorites.remove(&(user.clone(), item.clone()));
        if removed {
            if let Some(i) = items.iter_mut().find(|i| i.id == *item) {
                i.favorites_count -= 1;
            }
        }
        Ok(removed)
    }

    async fn is_favorited(&self, user: &UserId, item: &ItemId) -> Result<bool, RepositoryError> {
        let favorites = self.inner.favorites.lock().unwrap();
        Ok(favorites.contains(&(user.clone(), item.clone())))
    }
}

impl CommentRepository for MemStore {
    async fn create(&self, comment: &Comment) -> Result<Comment, RepositoryError> {
        let mut comments = self.inner.comments.lock().unwrap();
        comments.push(comment.clone());
        Ok(comment.clone())
    }

    async fn get_by_id(&self, id: &CommentId) -> Result<Option<Comment>, RepositoryError> {
        let comments = self.inner.comments.lock().unwrap();
        Ok(comments.iter().find(|c| c.id == *id).cloned())
    }

    async fn list_by_item(&self, item: &ItemId) -> Result<Vec<Comment>, RepositoryError> {
        let comments = self.inner.comments.lock().unwrap();
        let mut matched: Vec<Comment> = comments
            .iter()
            .filter(|c| c.item_id == *item)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }

    async fn delete(&self, id: &CommentId) -> Result<(), RepositoryError> {
        let mut comments = self.inner.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != *id);
        if comments.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Plaintext "hasher" for tests: hash = password reversed, salt fixed.
pub(crate) struct PlainCredentials;

impl crate::service::credential::CredentialStore for PlainCredentials {
    fn set_credential(
        &self,
        raw_password: &str,
    ) -> Result<crate::service::credential::Credential, souk_types::error::CredentialError> {
        Ok(crate::service::credential::Credential {
            hash: raw_password.chars().rev().collect(),
            salt: "static-salt".to_string(),
        })
    }

    fn verify_credential(
        &self,
        raw_password: &str,
        hash: &str,
        _salt: &str,
    ) -> Result<bool, souk_types::error::CredentialError> {
        let expected: String = raw_password.chars().rev().collect();
        Ok(expected == hash)
    }
}
