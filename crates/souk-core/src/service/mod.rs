//! Graph services and the ports they consume.
//!
//! Services are generic over the repository/crypto traits to keep the
//! layering clean -- souk-core never depends on souk-infra.

pub mod catalog;
pub mod credential;
pub mod discussion;
pub mod gate;
pub mod identity;
pub mod token;

#[cfg(test)]
pub(crate) mod testutil;

use souk_types::error::{DomainError, RepositoryError};

/// Map a repository error into the domain taxonomy.
///
/// `NotFound` is mapped by the caller with entity context; here it only
/// means a write raced a concurrent delete, which callers surface as
/// their own `NotFound`.
pub(crate) fn storage_err(err: RepositoryError) -> DomainError {
    match err {
        RepositoryError::Conflict(field) => DomainError::Conflict(field),
        RepositoryError::Unavailable => DomainError::Unavailable,
        RepositoryError::NotFound => DomainError::Storage("entity vanished mid-operation".to_string()),
        other => DomainError::Storage(other.to_string()),
    }
}
