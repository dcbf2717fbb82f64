//! HMAC-SHA256 signed session tokens.
//!
//! Token format: `base64url(claims JSON) . base64url(HMAC-SHA256)`,
//! MAC computed over the encoded claims with the process-wide secret.
//! Malformed input and bad signatures are `TokenError::Invalid`; a
//! valid signature past the validity window is `TokenError::Expired`.
//! Verification is constant-time (`Mac::verify_slice`).

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use souk_core::service::token::TokenService;
use souk_types::error::TokenError;
use souk_types::identity::{Identity, Role};
use souk_types::user::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside a token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// Subject: the user id.
    sub: Uuid,
    role: Role,
    /// Expiry as a unix timestamp (seconds).
    exp: i64,
}

/// HMAC-SHA256 implementation of `TokenService`.
pub struct HmacTokenService {
    secret: Vec<u8>,
    ttl: chrono::Duration,
}

impl HmacTokenService {
    /// Build a signer from the configured secret and validity window.
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: chrono::Duration::days(ttl_days),
        }
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, TokenError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Invalid)?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

impl TokenService for HmacTokenService {
    fn issue(&self, user_id: &UserId, role: Role) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: user_id.0,
            role,
            exp: (chrono::Utc::now() + self.ttl).timestamp(),
        };
        let json = serde_json::to_vec(&claims).map_err(|_| TokenError::Invalid)?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let sig = self.mac(&payload)?.finalize().into_bytes();
        Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(sig)))
    }

    fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        let (payload, sig) = token.split_once('.').ok_or(TokenError::Invalid)?;
        let sig = URL_SAFE_NO_PAD.decode(sig).map_err(|_| TokenError::Invalid)?;

        // Signature first: claims from an unverified payload mean nothing.
        self.mac(payload)?
            .verify_slice(&sig)
            .map_err(|_| TokenError::Invalid)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Invalid)?;
        let claims: TokenClaims =
            serde_json::from_slice(&json).map_err(|_| TokenError::Invalid)?;

        if claims.exp < chrono::Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(Identity::new(UserId::from_uuid(claims.sub), claims.role))
    }
}
