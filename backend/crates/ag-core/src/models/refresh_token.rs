use crate::ClientFingerprint;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted half of a refresh token. The raw secret is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub identity_id: Uuid,
    /// Shared by every link rotated out of the same login
    pub session_id: Uuid,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    /// Set once, when this link is rotated away
    pub replaced_by: Option<Uuid>,
    pub fingerprint: ClientFingerprint,
}

/// Position of a record in the rotation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Rotated,
    Revoked,
    Expired,
}

impl RefreshTokenState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Rotated => "rotated",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl RefreshTokenRecord {
    pub fn new(
        identity_id: Uuid,
        session_id: Uuid,
        token_hash: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        fingerprint: ClientFingerprint,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity_id,
            session_id,
            token_hash,
            issued_at,
            expires_at,
            revoked: false,
            revoked_at: None,
            replaced_by: None,
            fingerprint,
        }
    }

    /// Expiry is checked first: a secret past its lifetime is simply expired,
    /// whatever happened to it before. Within its lifetime a revoked or
    /// rotated record is a reuse signal.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.expires_at <= now {
            RefreshTokenState::Expired
        } else if self.revoked {
            RefreshTokenState::Revoked
        } else if self.replaced_by.is_some() {
            RefreshTokenState::Rotated
        } else {
            RefreshTokenState::Active
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == RefreshTokenState::Active
    }
}
