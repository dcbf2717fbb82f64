//! Discussion handlers: add, list, and delete comments.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use souk_types::comment::{CommentId, CommentView};
use souk_types::error::DomainError;
use souk_types::user::Profile;

use crate::http::error::AppError;
use crate::http::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub body: String,
}

/// POST /api/v1/items/:slug/comments - Comment on an item.
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(slug): Path<String>,
    Json(body): Json<AddCommentRequest>,
) -> Result<Json<ApiResponse<CommentView>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let comment = state
        .discussion
        .add_comment(&identity, &slug, body.body)
        .await?;

    // The author is the caller; nobody follows themself.
    let author = state.identity.get_user(&identity.user_id).await?;
    let view = CommentView::project(&comment, Profile::project(&author, false));
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &format!("/api/v1/items/{slug}/comments"));

    Ok(Json(resp))
}

/// GET /api/v1/items/:slug/comments - All comments, oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<CommentView>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let views = state.discussion.list_comments(&slug, viewer.as_ref()).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(views, request_id, elapsed)
        .with_link("self", &format!("/api/v1/items/{slug}/comments"));

    Ok(Json(resp))
}

/// DELETE /api/v1/items/:slug/comments/:id - Delete a comment
/// (author only).
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let comment_id: CommentId = id
        .parse()
        .map_err(|_| AppError::Domain(DomainError::NotFound("comment")))?;

    state.discussion.delete_comment(&identity, &comment_id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({"deleted": true, "id": id}),
        request_id,
        elapsed,
    )
    .with_link("comments", &format!("/api/v1/items/{slug}/comments"));

    Ok(Json(resp))
}
