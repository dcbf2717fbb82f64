//! Token service port: issuing and validating signed session tokens.
//!
//! The concrete implementation (HMAC-SHA256 over a compact payload)
//! lives in souk-infra. Tokens are signed with a process-wide secret
//! from configuration; forging a token without it must be
//! computationally infeasible.

use souk_types::error::TokenError;
use souk_types::identity::{Identity, Role};
use souk_types::user::UserId;

/// Port for session token issue/validate.
pub trait TokenService: Send + Sync {
    /// Issue a signed, time-bound token encoding the user id and role.
    fn issue(&self, user_id: &UserId, role: Role) -> Result<String, TokenError>;

    /// Validate a token and resolve the caller identity. Fails with
    /// `TokenError::Invalid` (malformed or bad signature) or
    /// `TokenError::Expired` (past the validity window).
    fn validate(&self, token: &str) -> Result<Identity, TokenError>;
}
