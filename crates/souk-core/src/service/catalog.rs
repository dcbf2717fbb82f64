//! Catalog graph: item lifecycle, slug assignment, favorites, listing
//! and the personalized feed.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::distributions::Alphanumeric;

use souk_types::error::DomainError;
use souk_types::event::MarketEvent;
use souk_types::identity::Identity;
use souk_types::item::{CreateItemRequest, Item, ItemId, ItemView, UpdateItemRequest, slugify};
use souk_types::user::{Profile, UserId};

use crate::event::EventBus;
use crate::repository::item::{ItemFilter, ItemRepository};
use crate::repository::user::UserRepository;
use crate::service::gate::can_mutate;
use crate::service::storage_err;

/// Attempts at slug generation before giving up with `Conflict`.
const SLUG_ATTEMPTS: usize = 4;

/// Service owning the item lifecycle and the favorites relation.
pub struct CatalogService<I: ItemRepository, U: UserRepository> {
    items: I,
    users: U,
    events: EventBus,
}

/// Short random disambiguator for colliding slugs (and a stand-in slug
/// for titles that normalize to nothing).
fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Drop empty entries and duplicates, preserving first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

impl<I: ItemRepository, U: UserRepository> CatalogService<I, U> {
    pub fn new(items: I, users: U, events: EventBus) -> Self {
        Self {
            items,
            users,
            events,
        }
    }

    /// Create a new listing owned by the caller.
    ///
    /// The slug is derived from the title; a commit-time uniqueness
    /// violation triggers regeneration with a fresh random suffix,
    /// bounded by [`SLUG_ATTEMPTS`] before failing with `Conflict`.
    pub async fn create_item(
        &self,
        identity: &Identity,
        request: CreateItemRequest,
    ) -> Result<Item, DomainError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("title", "title cannot be empty"));
        }

        let base_slug = {
            let normalized = slugify(&title);
            if normalized.is_empty() {
                random_suffix()
            } else {
                normalized
            }
        };

        let now = chrono::Utc::now();
        let mut item = Item {
            id: ItemId::new(),
            slug: base_slug.clone(),
            title,
            description: request.description,
            image: request.image,
            tags: normalize_tags(request.tags.unwrap_or_default()),
            seller_id: identity.user_id.clone(),
            favorites_count: 0,
            created_at: now,
            updated_at: now,
        };

        for attempt in 0..SLUG_ATTEMPTS {
            match self.items.create(&item).await {
                Ok(created) => {
                    tracing::info!(slug = %created.slug, "item created");
                    self.events.publish(MarketEvent::ItemCreated {
                        item: created.clone(),
                    });
                    return Ok(created);
                }
                Err(souk_types::error::RepositoryError::Conflict(_))
                    if attempt + 1 < SLUG_ATTEMPTS =>
                {
                    item.slug = format!("{base_slug}-{}", random_suffix());
                }
                Err(e) => return Err(storage_err(e)),
            }
        }
        Err(DomainError::Conflict("slug".to_string()))
    }

    pub async fn get_item(&self, slug: &str) -> Result<Item, DomainError> {
        self.items
            .get_by_slug(slug)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("item"))
    }

    /// Update a listing. Only the seller may do this; the slug stays
    /// stable even when the title changes.
    pub async fn update_item(
        &self,
        identity: &Identity,
        slug: &str,
        request: UpdateItemRequest,
    ) -> Result<Item, DomainError> {
        let mut item = self.get_item(slug).await?;

        if !can_mutate(Some(identity), &item.seller_id, false) {
            return Err(DomainError::Forbidden);
        }

        if let Some(title) = request.title {
            let trimmed = title.trim().to_string();
            if trimmed.is_empty() {
                return Err(DomainError::validation("title", "title cannot be empty"));
            }
            item.title = trimmed;
        }
        if let Some(description) = request.description {
            item.description = description;
        }
        if let Some(image) = request.image {
            item.image = Some(image);
        }
        if let Some(tags) = request.tags {
            item.tags = normalize_tags(tags);
        }

        item.updated_at = chrono::Utc::now();
        self.items.update(&item).await.map_err(storage_err)
    }

    /// Delete a listing and, transactionally, all of its comments.
    pub async fn delete_item(&self, identity: &Identity, slug: &str) -> Result<(), DomainError> {
        let item = self.get_item(slug).await?;

        if !can_mutate(Some(identity), &item.seller_id, false) {
            return Err(DomainError::Forbidden);
        }

        self.items.delete(&item.id).await.map_err(storage_err)
    }

    /// Favorite an item. Idempotent: re-favoriting is a no-op success.
    /// Membership and counter move together in the store.
    pub async fn favorite(&self, identity: &Identity, slug: &str) -> Result<ItemView, DomainError> {
        let item = self.get_item(slug).await?;
        self.items
            .favorite(&identity.user_id, &item.id)
            .await
            .map_err(storage_err)?;

        // Re-read for the post-mutation counter.
        let item = self.get_item(slug).await?;
        self.view(&item, Some(identity)).await
    }

    /// Reverse of [`CatalogService::favorite`], equally idempotent.
    pub async fn unfavorite(
        &self,
        identity: &Identity,
        slug: &str,
    ) -> Result<ItemView, DomainError> {
        let item = self.get_item(slug).await?;
        self.items
            .unfavorite(&identity.user_id, &item.id)
            .await
            .map_err(storage_err)?;

        let item = self.get_item(slug).await?;
        self.view(&item, Some(identity)).await
    }

    /// List items, newest first, with the total match count.
    pub async fn list_items(
        &self,
        filter: &ItemFilter,
        viewer: Option<&Identity>,
    ) -> Result<(Vec<ItemView>, i64), DomainError> {
        let (items, total) = self.items.list(filter).await.map_err(storage_err)?;
        let views = self.views(&items, viewer).await?;
        Ok((views, total))
    }

    /// The caller's feed: items whose seller the caller follows.
    pub async fn feed(
        &self,
        identity: &Identity,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<ItemView>, i64), DomainError> {
        let filter = ItemFilter {
            followed_by: Some(identity.user_id.clone()),
            limit,
            offset,
            ..Default::default()
        };
        self.list_items(&filter, Some(identity)).await
    }

    /// Project an item for a viewer: seller profile plus the viewer's
    /// favorited/following flags.
    pub async fn view(
        &self,
        item: &Item,
        viewer: Option<&Identity>,
    ) -> Result<ItemView, DomainError> {
        let views = self.views(std::slice::from_ref(item), viewer).await?;
        views
            .into_iter()
            .next()
            .ok_or(DomainError::NotFound("item"))
    }

    async fn views(
        &self,
        items: &[Item],
        viewer: Option<&Identity>,
    ) -> Result<Vec<ItemView>, DomainError> {
        let favorited: HashSet<ItemId> = match viewer {
            Some(viewer) => self
                .users
                .favorites_of(&viewer.user_id)
                .await
                .map_err(storage_err)?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        let mut sellers: HashMap<UserId, Profile> = HashMap::new();
        let mut views = Vec::with_capacity(items.len());

        for item in items {
            let seller = match sellers.get(&item.seller_id) {
                Some(profile) => profile.clone(),
                None => {
                    let user = self
                        .users
                        .get_by_id(&item.seller_id)
                        .await
                        .map_err(storage_err)?
                        .ok_or(DomainError::NotFound("user"))?;
                    let following = match viewer {
                        Some(viewer) => self
                            .users
                            .is_following(&viewer.user_id, &user.id)
                            .await
                            .map_err(storage_err)?,
                        None => false,
                    };
                    let profile = Profile::project(&user, following);
                    sellers.insert(item.seller_id.clone(), profile.clone());
                    profile
                }
            };

            views.push(ItemView::project(
                item,
                seller,
                favorited.contains(&item.id),
            ));
        }

        Ok(views)
    }
}
