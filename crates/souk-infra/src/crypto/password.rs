//! Argon2id credential store.
//!
//! Implements the `CredentialStore` port from `souk-core`: a fresh
//! random 16-byte salt per credential, a 64-byte Argon2id digest, and
//! constant-time verification. Cost parameters come from `CoreConfig`
//! and are immutable after construction.
//!
//! SECURITY: Error types never contain password material.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use souk_core::service::credential::{Credential, CredentialStore};
use souk_types::config::CoreConfig;
use souk_types::error::CredentialError;

use super::{hex_decode, hex_encode};

/// Salt length in bytes.
const SALT_LEN: usize = 16;
/// Digest length in bytes (512 bits).
const HASH_LEN: usize = 64;

/// Argon2id implementation of `CredentialStore`.
pub struct Argon2CredentialStore {
    memory_kib: u32,
    passes: u32,
    lanes: u32,
}

impl Argon2CredentialStore {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            memory_kib: config.argon_memory_kib,
            passes: config.argon_passes,
            lanes: config.argon_lanes,
        }
    }

    fn derive(&self, password: &str, salt: &[u8]) -> Result<[u8; HASH_LEN], CredentialError> {
        let params = Params::new(self.memory_kib, self.passes, self.lanes, Some(HASH_LEN))
            .map_err(|_| CredentialError::Derivation)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = [0u8; HASH_LEN];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut out)
            .map_err(|_| CredentialError::Derivation)?;
        Ok(out)
    }
}

impl CredentialStore for Argon2CredentialStore {
    fn set_credential(&self, raw_password: &str) -> Result<Credential, CredentialError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let hash = self.derive(raw_password, &salt)?;
        Ok(Credential {
            hash: hex_encode(&hash),
            salt: hex_encode(&salt),
        })
    }

    fn verify_credential(
        &self,
        raw_password: &str,
        hash: &str,
        salt: &str,
    ) -> Result<bool, CredentialError> {
        let salt = hex_decode(salt).ok_or(CredentialError::Malformed)?;
        let expected = hex_decode(hash).ok_or(CredentialError::Malformed)?;
        if expected.len() != HASH_LEN {
            return Err(CredentialError::Malformed);
        }

        let actual = self.derive(raw_password, &salt)?;
        Ok(actual.ct_eq(expected.as_slice()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheap parameters: these tests exercise correctness, not cost.
    fn store() -> Argon2CredentialStore {
        Argon2CredentialStore::new(&CoreConfig {
            argon_memory_kib: 1024,
            argon_passes: 1,
            argon_lanes: 1,
            ..Default::default()
        })
    }

    #[test]
    fn test_set_and_verify_roundtrip() {
        let store = store();
        let cred = store.set_credential("correct horse").unwrap();

        assert!(store
            .verify_credential("correct horse", &cred.hash, &cred.salt)
            .unwrap());
        assert!(!store
            .verify_credential("wrong horse", &cred.hash, &cred.salt)
            .unwrap());
    }

    #[test]
    fn test_fresh_salt_per_credential() {
        let store = store();
        let a = store.set_credential("same password").unwrap();
        let b = store.set_credential("same password").unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_hash_is_512_bits() {
        let store = store();
        let cred = store.set_credential("correct horse").unwrap();
        assert_eq!(cred.hash.len(), HASH_LEN * 2);
        assert_eq!(cred.salt.len(), SALT_LEN * 2);
    }

    #[test]
    fn test_malformed_stored_credential() {
        let store = store();
        let err = store
            .verify_credential("pw", "not hex!", "00112233445566778899aabbccddeeff")
            .unwrap_err();
        assert!(matches!(err, CredentialError::Malformed));

        // Truncated hash is malformed, not a mismatch.
        let err = store
            .verify_credential("pw", "aabb", "00112233445566778899aabbccddeeff")
            .unwrap_err();
        assert!(matches!(err, CredentialError::Malformed));
    }

    #[test]
    fn test_tampered_hash_fails_verification() {
        let store = store();
        let cred = store.set_credential("correct horse").unwrap();
        let mut tampered = cred.hash.clone().into_bytes();
        tampered[0] = if tampered[0] == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(!store
            .verify_credential("correct horse", &tampered, &cred.salt)
            .unwrap());
    }
}
