//! Infrastructure layer for Souk.
//!
//! Contains implementations of the ports defined in `souk-core`:
//! SQLite repositories, the Argon2id credential store, the HMAC-SHA256
//! token signer, and the configuration loader.

pub mod config;
pub mod crypto;
pub mod sqlite;
