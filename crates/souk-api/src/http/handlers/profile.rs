//! Public profile handlers: lookup, follow, unfollow.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use crate::http::error::AppError;
use crate::http::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::http::response::ApiResponse;
use crate::state::AppState;

use souk_types::user::Profile;

/// GET /api/v1/profiles/:username - Public profile, auth optional.
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let profile = state.identity.profile(&username, viewer.as_ref()).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(profile, request_id, elapsed)
        .with_link("self", &format!("/api/v1/profiles/{username}"));

    Ok(Json(resp))
}

/// POST /api/v1/profiles/:username/follow - Follow a user. Idempotent.
pub async fn follow(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let profile = state.identity.follow(&identity, &username).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(profile, request_id, elapsed)
        .with_link("self", &format!("/api/v1/profiles/{username}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/profiles/:username/follow - Unfollow. Idempotent.
pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let profile = state.identity.unfollow(&identity, &username).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(profile, request_id, elapsed)
        .with_link("self", &format!("/api/v1/profiles/{username}"));

    Ok(Json(resp))
}
