//! Bearer-token authentication extractors.
//!
//! Two modes, matching what the graph services expect at the caller
//! boundary:
//! - [`AuthUser`]: token required. Absence or invalidity is a 401.
//! - [`MaybeAuthUser`]: token optional. Absence means an anonymous
//!   caller; a present-but-invalid token is still a 401.
//!
//! Tokens arrive as `Authorization: Bearer <token>` (or the legacy
//! `Token <token>` prefix). Invalid and expired tokens produce the same
//! message -- nothing beyond "re-authenticate" is leaked.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use souk_core::service::token::TokenService;
use souk_types::identity::Identity;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated caller. Extraction fails without a valid token.
pub struct AuthUser(pub Identity);

/// Optionally authenticated caller. `None` means anonymous.
pub struct MaybeAuthUser(pub Option<Identity>);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?.ok_or_else(|| {
            AppError::Unauthorized(
                "Missing token. Provide via 'Authorization: Bearer <token>' header.".to_string(),
            )
        })?;

        let identity = state
            .tokens
            .validate(&token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_string()))?;

        Ok(AuthUser(identity))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match extract_token(parts)? {
            None => Ok(MaybeAuthUser(None)),
            Some(token) => {
                let identity = state.tokens.validate(&token).map_err(|_| {
                    AppError::Unauthorized("Invalid or expired token.".to_string())
                })?;
                Ok(MaybeAuthUser(Some(identity)))
            }
        }
    }
}

/// Extract the bearer token from request headers, if present.
fn extract_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(auth) = parts.headers.get("authorization") else {
        return Ok(None);
    };

    let auth_str = auth
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".to_string()))?;

    for prefix in ["Bearer ", "Token "] {
        if let Some(token) = auth_str.strip_prefix(prefix) {
            return Ok(Some(token.trim().to_string()));
        }
    }

    Err(AppError::Unauthorized(
        "Unsupported Authorization scheme; use 'Bearer <token>'.".to_string(),
    ))
}
