//! Catalog handlers: listing, feed, CRUD, favorite/unfavorite.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};

use souk_core::repository::item::ItemFilter;
use souk_types::item::{CreateItemRequest, ItemView, UpdateItemRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::http::extractors::query::{ItemListQuery, PageQuery};
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn item_page(views: Vec<ItemView>, total: i64) -> serde_json::Value {
    serde_json::json!({
        "items": views,
        "total": total,
    })
}

/// GET /api/v1/items - List items with filters, newest first.
pub async fn list_items(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let filter = ItemFilter {
        tag: query.tag,
        seller: query.seller,
        favorited_by: query.favorited,
        followed_by: None,
        limit: Some(query.limit),
        offset: Some(query.offset),
    };
    let (views, total) = state.catalog.list_items(&filter, viewer.as_ref()).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(item_page(views, total), request_id, elapsed)
        .with_link("self", "/api/v1/items");

    Ok(Json(resp))
}

/// GET /api/v1/items/feed - Items from sellers the caller follows.
pub async fn feed(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let (views, total) = state
        .catalog
        .feed(&identity, Some(query.limit), Some(query.offset))
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(item_page(views, total), request_id, elapsed)
        .with_link("self", "/api/v1/items/feed");

    Ok(Json(resp))
}

/// POST /api/v1/items - Create a listing owned by the caller.
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(body): Json<CreateItemRequest>,
) -> Result<Json<ApiResponse<ItemView>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let item = state.catalog.create_item(&identity, body).await?;
    let view = state.catalog.view(&item, Some(&identity)).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let slug = view.slug.clone();
    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/items/{slug}"))
        .with_link("comments", &format!("/api/v1/items/{slug}/comments"));

    Ok(Json(resp))
}

/// GET /api/v1/items/:slug - Fetch a single listing, auth optional.
pub async fn get_item(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ItemView>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let item = state.catalog.get_item(&slug).await?;
    let view = state.catalog.view(&item, viewer.as_ref()).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/items/{slug}"))
        .with_link("comments", &format!("/api/v1/items/{slug}/comments"));

    Ok(Json(resp))
}

/// PUT /api/v1/items/:slug - Update a listing (seller only).
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(slug): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ApiResponse<ItemView>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let item = state.catalog.update_item(&identity, &slug, body).await?;
    let view = state.catalog.view(&item, Some(&identity)).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/items/{slug}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/items/:slug - Delete a listing and its comments
/// (seller only).
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    state.catalog.delete_item(&identity, &slug).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({"deleted": true, "slug": slug}),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}

/// POST /api/v1/items/:slug/favorite - Favorite. Idempotent.
pub async fn favorite(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ItemView>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let view = state.catalog.favorite(&identity, &slug).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/items/{slug}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/items/:slug/favorite - Unfavorite. Idempotent.
pub async fn unfavorite(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ItemView>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let view = state.catalog.unfavorite(&identity, &slug).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/items/{slug}"));

    Ok(Json(resp))
}
