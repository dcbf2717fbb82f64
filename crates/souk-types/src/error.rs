use thiserror::Error;

/// The error taxonomy every graph operation speaks.
///
/// `Unauthorized` and `Forbidden` deliberately carry no detail about
/// which check failed.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input; `field` names the offending field.
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Uniqueness violation on the named field or resource.
    #[error("{0} already exists")]
    Conflict(String),

    /// Missing or invalid identity.
    #[error("unauthorized")]
    Unauthorized,

    /// Valid identity, insufficient rights.
    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Transient persistence failure; the caller may retry.
    #[error("storage temporarily unavailable")]
    Unavailable,

    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Shorthand for a field-level validation error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Errors from the credential store.
///
/// Verification mismatch is NOT an error -- `verify_credential` returns
/// `Ok(false)`. This enum covers derivation failures only, and never
/// carries password material.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential derivation failed")]
    Derivation,

    #[error("stored credential is malformed")]
    Malformed,
}

/// Errors from token validation.
///
/// Both variants surface to HTTP callers as a plain 401; the split
/// exists only so clients can decide whether re-authenticating is worth
/// a retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token invalid")]
    Invalid,

    #[error("token expired")]
    Expired,
}

/// Errors from repository operations (used by trait definitions in souk-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    /// Unique-constraint violation; the payload names the field.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transient failure (busy database, pool timeout); retryable.
    #[error("storage unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_field() {
        let err = DomainError::validation("username", "cannot be empty");
        assert_eq!(err.to_string(), "username: cannot be empty");
    }

    #[test]
    fn test_opaque_auth_errors() {
        // Neither variant may reveal which check failed.
        assert_eq!(DomainError::Unauthorized.to_string(), "unauthorized");
        assert_eq!(DomainError::Forbidden.to_string(), "forbidden");
    }

    #[test]
    fn test_repository_conflict_display() {
        let err = RepositoryError::Conflict("slug".to_string());
        assert_eq!(err.to_string(), "conflict: slug");
    }

    #[test]
    fn test_token_error_variants_distinct() {
        assert_ne!(TokenError::Invalid, TokenError::Expired);
    }
}
