use ag_core::{CoreError, Role};
use ag_db::DbError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Why a refresh secret was refused. Kept for logs and audit context only;
/// callers outside the crate see a single "session invalid" answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInvalidReason {
    Expired,
    NotFound,
    ReuseDetected,
    Revoked,
    IdentityInactive,
}

impl SessionInvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::NotFound => "not_found",
            Self::ReuseDetected => "reuse_detected",
            Self::Revoked => "revoked",
            Self::IdentityInactive => "identity_inactive",
        }
    }
}

impl std::fmt::Display for SessionInvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials {location}")]
    InvalidCredentials { location: ErrorLocation },

    #[error("Too many attempts, retry after {retry_after_secs}s {location}")]
    RateLimited {
        retry_after_secs: u64,
        location: ErrorLocation,
    },

    #[error("Session invalid ({reason}) {location}")]
    SessionInvalid {
        reason: SessionInvalidReason,
        location: ErrorLocation,
    },

    #[error("Account disabled {location}")]
    AccountDisabled { location: ErrorLocation },

    #[error("Unauthorized: {message} {location}")]
    Unauthorized {
        message: String,
        location: ErrorLocation,
    },

    #[error("Forbidden: requires {required} {location}")]
    Forbidden {
        required: Role,
        location: ErrorLocation,
    },

    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    #[error("Not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("Database error: {source} {location}")]
    Database {
        #[source]
        source: DbError,
        location: ErrorLocation,
    },

    #[error("JWT error: {source} {location}")]
    Jwt {
        #[source]
        source: jsonwebtoken::errors::Error,
        location: ErrorLocation,
    },

    #[error("Password hashing failed: {message} {location}")]
    PasswordHash {
        message: String,
        location: ErrorLocation,
    },

    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl AuthError {
    #[track_caller]
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn session_invalid(reason: SessionInvalidReason) -> Self {
        Self::SessionInvalid {
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(String::from),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// True for failures of the service itself rather than of the caller
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database { .. } | Self::Jwt { .. } | Self::PasswordHash { .. } | Self::Internal { .. }
        )
    }
}

impl From<DbError> for AuthError {
    #[track_caller]
    fn from(source: DbError) -> Self {
        Self::Database {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for AuthError {
    #[track_caller]
    fn from(err: CoreError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match err {
            CoreError::Validation { message, field, .. } => Self::Validation {
                message,
                field,
                location,
            },
            other => Self::Validation {
                message: other.to_string(),
                field: None,
                location,
            },
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    #[track_caller]
    fn from(source: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
