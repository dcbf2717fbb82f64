//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use souk_types::error::DomainError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Domain-level errors from the graph services.
    Domain(DomainError),
    /// Authentication failure at the caller boundary.
    Unauthorized(String),
    /// Generic internal error.
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::Domain(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Domain(DomainError::Validation { field, message }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                format!("{field}: {message}"),
                Some(json!({ "field": field })),
            ),
            AppError::Domain(DomainError::Conflict(field)) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("{field} already exists"),
                Some(json!({ "field": field })),
            ),
            // Opaque by design: never say which check failed.
            AppError::Domain(DomainError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "unauthorized".to_string(),
                None,
            ),
            AppError::Domain(DomainError::Forbidden) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "forbidden".to_string(),
                None,
            ),
            AppError::Domain(DomainError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{what} not found"),
                None,
            ),
            AppError::Domain(DomainError::Unavailable) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UNAVAILABLE",
                "storage temporarily unavailable, retry later".to_string(),
                None,
            ),
            AppError::Domain(DomainError::Storage(msg)) => {
                tracing::error!(error = %msg, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                    None,
                )
            }
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                msg.clone(),
                None,
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                    None,
                )
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
                "details": details,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::Domain(DomainError::validation("title", "empty")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Domain(DomainError::Conflict("slug".to_string())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Domain(DomainError::Unauthorized),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Domain(DomainError::Forbidden),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::Domain(DomainError::NotFound("item")),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Domain(DomainError::Unavailable),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
