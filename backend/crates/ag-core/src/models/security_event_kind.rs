use crate::{CoreError, Result as CoreErrorResult};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Every authentication-relevant event the audit trail records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    Registered,
    LoginSuccess,
    LoginFailure,
    Logout,
    RefreshSuccess,
    RefreshFailure,
    RefreshReuseDetected,
    TokenRevoked,
    RateLimited,
    PasswordResetRequested,
    PasswordResetCompleted,
    EmailVerified,
    AccountDisabled,
    AccountEnabled,
    RoleChanged,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::Logout => "logout",
            Self::RefreshSuccess => "refresh_success",
            Self::RefreshFailure => "refresh_failure",
            Self::RefreshReuseDetected => "refresh_reuse_detected",
            Self::TokenRevoked => "token_revoked",
            Self::RateLimited => "rate_limited",
            Self::PasswordResetRequested => "password_reset_requested",
            Self::PasswordResetCompleted => "password_reset_completed",
            Self::EmailVerified => "email_verified",
            Self::AccountDisabled => "account_disabled",
            Self::AccountEnabled => "account_enabled",
            Self::RoleChanged => "role_changed",
        }
    }
}

impl FromStr for SecurityEventKind {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        match s {
            "registered" => Ok(Self::Registered),
            "login_success" => Ok(Self::LoginSuccess),
            "login_failure" => Ok(Self::LoginFailure),
            "logout" => Ok(Self::Logout),
            "refresh_success" => Ok(Self::RefreshSuccess),
            "refresh_failure" => Ok(Self::RefreshFailure),
            "refresh_reuse_detected" => Ok(Self::RefreshReuseDetected),
            "token_revoked" => Ok(Self::TokenRevoked),
            "rate_limited" => Ok(Self::RateLimited),
            "password_reset_requested" => Ok(Self::PasswordResetRequested),
            "password_reset_completed" => Ok(Self::PasswordResetCompleted),
            "email_verified" => Ok(Self::EmailVerified),
            "account_disabled" => Ok(Self::AccountDisabled),
            "account_enabled" => Ok(Self::AccountEnabled),
            "role_changed" => Ok(Self::RoleChanged),
            _ => Err(CoreError::InvalidSecurityEventKind {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
