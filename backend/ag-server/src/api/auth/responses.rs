use ag_auth::SessionTokens;
use ag_core::{Identity, Role};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Public view of an identity; never carries the password hash
#[derive(Debug, Serialize)]
pub struct IdentityDto {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Identity> for IdentityDto {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            role: identity.role,
            is_active: identity.is_active,
            is_verified: identity.is_verified,
            created_at: identity.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the access token expires
    pub expires_in: i64,
    pub refresh_token: String,
}

impl TokenResponse {
    pub fn new(tokens: SessionTokens, access_lifetime: Duration) -> Self {
        Self {
            expires_in: access_lifetime.num_seconds(),
            access_token: tokens.access_token.token,
            token_type: "bearer",
            refresh_token: tokens.refresh_secret.into_inner(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub detail: String,
}

impl MessageResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
