//! Credential store port: password hashing and verification.
//!
//! The concrete implementation (Argon2id) lives in souk-infra. Raw
//! passwords exist only transiently on the stack of these two calls and
//! are never stored or logged.

use souk_types::error::CredentialError;

/// A derived credential: hash plus the per-user salt it was derived
/// with, both hex-encoded for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub hash: String,
    pub salt: String,
}

/// Port for password hashing and verification.
pub trait CredentialStore: Send + Sync {
    /// Derive a credential from a raw password with a fresh random salt.
    fn set_credential(&self, raw_password: &str) -> Result<Credential, CredentialError>;

    /// Recompute the hash with the stored salt and compare in constant
    /// time. A mismatch is `Ok(false)`, not an error.
    fn verify_credential(
        &self,
        raw_password: &str,
        hash: &str,
        salt: &str,
    ) -> Result<bool, CredentialError>;
}
