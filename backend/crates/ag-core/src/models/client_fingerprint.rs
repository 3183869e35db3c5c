use serde::{Deserialize, Serialize};

/// Where a request came from, captured when a refresh token is issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFingerprint {
    pub ip_address: String,
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    pub fn new(ip_address: impl Into<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent,
        }
    }
}
