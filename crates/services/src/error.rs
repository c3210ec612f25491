//! Shared error types for the services crate.

use reqwest::StatusCode;
use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Failure of a backend call.
///
/// A rejected request carries the backend's `detail` when it sent one and
/// always carries a displayable message (the detail or a per-operation
/// fallback).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{message}")]
    Rejected {
        status: StatusCode,
        detail: Option<String>,
        message: String,
    },
    /// An admin endpoint refused the current user.
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub(crate) fn rejected(status: StatusCode, detail: Option<String>, fallback: &str) -> Self {
        let message = detail.clone().unwrap_or_else(|| fallback.to_owned());
        Self::Rejected {
            status,
            detail,
            message,
        }
    }

    /// HTTP status of a rejected request.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(StatusCode::FORBIDDEN),
            ApiError::Http(err) => err.status(),
            ApiError::Storage(_) => None,
        }
    }

    /// Backend-supplied explanation, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The stored token was missing, expired, or rejected.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_prefers_detail_over_fallback() {
        let err = ApiError::rejected(StatusCode::BAD_REQUEST, Some("Email taken".into()), "Registration failed");
        assert_eq!(err.to_string(), "Email taken");
        assert_eq!(err.detail(), Some("Email taken"));

        let err = ApiError::rejected(StatusCode::BAD_GATEWAY, None, "Registration failed");
        assert_eq!(err.to_string(), "Registration failed");
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn unauthorized_reads_as_forbidden() {
        assert_eq!(ApiError::Unauthorized.to_string(), "Unauthorized");
        assert!(!ApiError::Unauthorized.is_auth_failure());
        assert!(ApiError::rejected(StatusCode::UNAUTHORIZED, None, "x").is_auth_failure());
    }
}
