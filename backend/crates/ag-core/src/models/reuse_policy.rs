use crate::{CoreError, Result as CoreErrorResult};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// What gets revoked when a refresh secret is presented a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReusePolicy {
    /// Only the chain the reused secret belongs to
    #[default]
    ChainOnly,
    /// Every session the identity holds
    AllSessions,
}

impl ReusePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChainOnly => "chain_only",
            Self::AllSessions => "all_sessions",
        }
    }
}

impl FromStr for ReusePolicy {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        match s {
            "chain_only" => Ok(Self::ChainOnly),
            "all_sessions" => Ok(Self::AllSessions),
            _ => Err(CoreError::InvalidPolicy {
                name: "reuse_policy",
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl std::fmt::Display for ReusePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
