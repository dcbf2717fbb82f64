use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::{Profile, UserId};

/// Unique identifier for an item, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A listing in the marketplace catalog.
///
/// `slug` is globally unique and URL-safe, derived from the title at
/// creation. `favorites_count` is a derived field: it always equals the
/// number of distinct users whose favorites set contains this item, and
/// is only ever mutated alongside that set, never directly by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    /// Ordered tag list; duplicates removed at creation.
    pub tags: Vec<String>,
    /// Owning user. Only the seller may mutate the item.
    pub seller_id: UserId,
    pub favorites_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Partial listing update. The slug is stable: retitling an item does
/// not move its URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// An item projected for a specific viewer: carries the seller profile
/// and whether the viewer has favorited it (always false for anonymous
/// viewers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub favorited: bool,
    pub favorites_count: i64,
    pub seller: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemView {
    /// Pure projection of an item for a given viewer.
    pub fn project(item: &Item, seller: Profile, favorited: bool) -> Self {
        Self {
            slug: item.slug.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            tags: item.tags.clone(),
            favorited,
            favorites_count: item.favorites_count,
            seller,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Generate a URL-safe slug from a title.
///
/// Rules:
/// - Lowercase
/// - Collapse runs of non-alphanumeric characters into a single hyphen
/// - Trim leading/trailing hyphens
///
/// An empty result (e.g. an all-punctuation title) is the caller's
/// problem: the catalog substitutes a random token in that case.
///
/// # Examples
///
/// ```
/// use souk_types::item::slugify;
///
/// assert_eq!(slugify("Vintage Lamp"), "vintage-lamp");
/// assert_eq!(slugify("Mid-century  chair!"), "mid-century-chair");
/// assert_eq!(slugify("---hello---world---"), "hello-world");
/// ```
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();

    // Collapse consecutive hyphens and trim edges
    let mut result = String::with_capacity(slug.len());
    let mut prev_was_hyphen = true; // treat start as hyphen to trim leading
    for c in slug.chars() {
        if c == '-' {
            if !prev_was_hyphen {
                result.push('-');
            }
            prev_was_hyphen = true;
        } else {
            result.push(c);
            prev_was_hyphen = false;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}
