use crate::{CoreError, Result as CoreErrorResult};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// What a failed-attempt counter is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    LoginByEmail,
    LoginByIp,
}

impl AttemptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginByEmail => "login_by_email",
            Self::LoginByIp => "login_by_ip",
        }
    }
}

impl FromStr for AttemptKind {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        match s {
            "login_by_email" => Ok(Self::LoginByEmail),
            "login_by_ip" => Ok(Self::LoginByIp),
            _ => Err(CoreError::InvalidAttemptKind {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl std::fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
