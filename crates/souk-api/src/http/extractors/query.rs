//! Query parameter types for list endpoints.

use serde::Deserialize;

fn default_limit() -> i64 {
    20
}

/// Query parameters for `GET /items`.
#[derive(Debug, Deserialize)]
pub struct ItemListQuery {
    /// Only items carrying this tag.
    pub tag: Option<String>,
    /// Only items sold by this username.
    pub seller: Option<String>,
    /// Only items favorited by this username.
    pub favorited: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Plain offset/limit pagination (`GET /items/feed`).
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
