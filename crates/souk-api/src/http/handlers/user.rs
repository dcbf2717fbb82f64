//! User account handlers: register, login, current user, profile update.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use souk_core::service::token::TokenService;
use souk_types::user::{LoginRequest, RegisterRequest, UpdateProfileRequest, User};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Account payload: the caller's own user plus a session token.
fn account(user: &User, token: String) -> serde_json::Value {
    serde_json::json!({
        "username": user.username,
        "email": user.email,
        "bio": user.bio,
        "image": user.image,
        "token": token,
    })
}

/// POST /api/v1/users - Register a new user.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let user = state.identity.register(body).await?;
    let token = state
        .tokens
        .issue(&user.id, user.role)
        .map_err(|_| AppError::Internal("token issuance failed".to_string()))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(account(&user, token), request_id, elapsed)
        .with_link("self", "/api/v1/user")
        .with_link("profile", &format!("/api/v1/profiles/{}", user.username));

    Ok(Json(resp))
}

/// POST /api/v1/users/login - Authenticate and issue a token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let user = state.identity.authenticate(&body.email, &body.password).await?;
    let token = state
        .tokens
        .issue(&user.id, user.role)
        .map_err(|_| AppError::Internal("token issuance failed".to_string()))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(account(&user, token), request_id, elapsed)
        .with_link("self", "/api/v1/user");

    Ok(Json(resp))
}

/// GET /api/v1/user - The authenticated caller's own account.
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let user = state.identity.get_user(&identity.user_id).await?;
    let token = state
        .tokens
        .issue(&user.id, user.role)
        .map_err(|_| AppError::Internal("token issuance failed".to_string()))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(account(&user, token), request_id, elapsed)
        .with_link("self", "/api/v1/user");

    Ok(Json(resp))
}

/// PUT /api/v1/user - Partial update of the caller's own account.
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let user = state
        .identity
        .update_profile(&identity, &identity.user_id, body)
        .await?;
    let token = state
        .tokens
        .issue(&user.id, user.role)
        .map_err(|_| AppError::Internal("token issuance failed".to_string()))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(account(&user, token), request_id, elapsed)
        .with_link("self", "/api/v1/user");

    Ok(Json(resp))
}
