//! Client-facing errors.
//!
//! Every response carries `{ "error": { code, message, field? } }`. Login
//! and session failures collapse to one message each so the body never
//! says which check failed.

use ag_auth::AuthError;

use std::panic::Location;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use log::{debug, error};
use serde::Serialize;
use thiserror::Error;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
pub const SESSION_INVALID_MESSAGE: &str = "Session invalid, please log in again";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable code, e.g. "SESSION_INVALID"
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401
    #[error("Invalid credentials {location}")]
    InvalidCredentials { location: ErrorLocation },

    /// 401, every refresh or logout failure
    #[error("Session invalid {location}")]
    SessionInvalid { location: ErrorLocation },

    /// 403
    #[error("Account disabled {location}")]
    AccountDisabled { location: ErrorLocation },

    /// 401, missing or bad bearer token
    #[error("Unauthorized: {message} {location}")]
    Unauthorized {
        message: String,
        location: ErrorLocation,
    },

    /// 403
    #[error("Forbidden: {message} {location}")]
    Forbidden {
        message: String,
        location: ErrorLocation,
    },

    /// 429 with `Retry-After`
    #[error("Rate limited for {retry_after_secs}s {location}")]
    RateLimited {
        retry_after_secs: u64,
        location: ErrorLocation,
    },

    /// 404
    #[error("Not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    /// 400, message returned verbatim
    #[error("Validation failed: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    /// 400, malformed request
    #[error("Bad request: {message} {location}")]
    BadRequest {
        message: String,
        location: ErrorLocation,
    },

    /// 500. `detail` is shown to the client only when set.
    #[error("Internal error {location}")]
    Internal {
        detail: Option<String>,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
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
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Logs `message`; the client sees the generic text
    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        error!("{}", message);
        Self::Internal {
            detail: None,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Map a service error. `expose_detail` keeps the internal error text
    /// in the response body.
    #[track_caller]
    pub fn from_auth(e: AuthError, expose_detail: bool) -> Self {
        let location = ErrorLocation::from(Location::caller());

        match e {
            AuthError::InvalidCredentials { .. } => Self::InvalidCredentials { location },
            AuthError::SessionInvalid { reason, .. } => {
                debug!("Session rejected: {}", reason);
                Self::SessionInvalid { location }
            }
            AuthError::AccountDisabled { .. } => Self::AccountDisabled { location },
            AuthError::RateLimited {
                retry_after_secs, ..
            } => Self::RateLimited {
                retry_after_secs,
                location,
            },
            AuthError::Unauthorized { message, .. } => Self::Unauthorized { message, location },
            AuthError::Forbidden { required, .. } => Self::Forbidden {
                message: format!("Requires role {required}"),
                location,
            },
            AuthError::Validation { message, field, .. } => Self::Validation {
                message,
                field,
                location,
            },
            AuthError::NotFound { message, .. } => Self::NotFound { message, location },
            internal @ (AuthError::Database { .. }
            | AuthError::Jwt { .. }
            | AuthError::PasswordHash { .. }
            | AuthError::Internal { .. }) => {
                error!("{}", internal);
                Self::Internal {
                    detail: expose_detail.then(|| internal.to_string()),
                    location,
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials { .. }
            | Self::SessionInvalid { .. }
            | Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::AccountDisabled { .. } | Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("{}", self);

        let status = self.status();
        let mut retry_after = None;

        let body = match self {
            Self::InvalidCredentials { .. } => ApiErrorBody {
                code: "INVALID_CREDENTIALS",
                message: INVALID_CREDENTIALS_MESSAGE.into(),
                field: None,
            },
            Self::SessionInvalid { .. } => ApiErrorBody {
                code: "SESSION_INVALID",
                message: SESSION_INVALID_MESSAGE.into(),
                field: None,
            },
            Self::AccountDisabled { .. } => ApiErrorBody {
                code: "ACCOUNT_DISABLED",
                message: "Account disabled".into(),
                field: None,
            },
            Self::Unauthorized { message, .. } => ApiErrorBody {
                code: "UNAUTHORIZED",
                message,
                field: None,
            },
            Self::Forbidden { message, .. } => ApiErrorBody {
                code: "FORBIDDEN",
                message,
                field: None,
            },
            Self::RateLimited {
                retry_after_secs, ..
            } => {
                retry_after = Some(retry_after_secs);
                ApiErrorBody {
                    code: "RATE_LIMITED",
                    message: format!("Too many attempts, retry in {retry_after_secs} seconds"),
                    field: None,
                }
            }
            Self::NotFound { message, .. } => ApiErrorBody {
                code: "NOT_FOUND",
                message,
                field: None,
            },
            Self::Validation { message, field, .. } => ApiErrorBody {
                code: "VALIDATION_ERROR",
                message,
                field,
            },
            Self::BadRequest { message, .. } => ApiErrorBody {
                code: "BAD_REQUEST",
                message,
                field: None,
            },
            Self::Internal { detail, .. } => ApiErrorBody {
                code: "INTERNAL_ERROR",
                message: detail.unwrap_or_else(|| INTERNAL_ERROR_MESSAGE.into()),
                field: None,
            },
        };

        let mut response = (status, Json(ApiErrorResponse { error: body })).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Production mapping, used where no state is at hand
impl From<AuthError> for ApiError {
    #[track_caller]
    fn from(e: AuthError) -> Self {
        Self::from_auth(e, false)
    }
}

impl From<JsonRejection> for ApiError {
    #[track_caller]
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    #[track_caller]
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    #[track_caller]
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
