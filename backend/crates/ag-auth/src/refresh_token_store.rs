//! Refresh token rotation with reuse detection.
//!
//! Every presented secret is either the tip of its chain (rotated exactly
//! once), expired, unknown, or a replay. A replay revokes the rest of the
//! chain so a stolen secret and its legitimate twin both stop working.

use crate::error::SessionInvalidReason;
use crate::secret::hash_secret;
use crate::{
    AccessToken, AuthError, AuthMetrics, Clock, RawRefreshSecret, Result as AuthErrorResult,
    SecurityAuditLog, TokenIssuer,
};

use ag_core::{
    ClientFingerprint, Identity, RefreshTokenRecord, RefreshTokenState, ReusePolicy,
    SecurityEventKind, SecurityLogEntry,
};
use ag_db::{DbError, IdentityRepository, RefreshTokenRepository, RotateOutcome};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// A successful rotation
#[derive(Debug)]
pub struct Redeemed {
    pub identity: Identity,
    pub access_token: AccessToken,
    pub refresh_secret: RawRefreshSecret,
    /// The new tip
    pub record: RefreshTokenRecord,
    /// The link that was presented and is now rotated away
    pub previous_id: Uuid,
}

#[derive(Error, Debug)]
pub enum RedeemError {
    #[error("Refresh token reuse detected, {} links revoked", chain.len())]
    ReuseDetected {
        /// Links revoked, from the presented one to the tip
        chain: Vec<Uuid>,
        /// State of the presented record before containment
        presented: RefreshTokenState,
    },

    #[error("Refresh token expired")]
    Expired,

    #[error("Refresh token not found")]
    NotFound,

    #[error("Identity is inactive")]
    IdentityInactive,

    #[error("Refresh token store failure: {source}")]
    Store {
        #[source]
        source: AuthError,
    },
}

impl RedeemError {
    /// Reason recorded for a refusal; None for store failures
    pub fn reason(&self) -> Option<SessionInvalidReason> {
        match self {
            Self::ReuseDetected {
                presented: RefreshTokenState::Revoked,
                ..
            } => Some(SessionInvalidReason::Revoked),
            Self::ReuseDetected { .. } => Some(SessionInvalidReason::ReuseDetected),
            Self::Expired => Some(SessionInvalidReason::Expired),
            Self::NotFound => Some(SessionInvalidReason::NotFound),
            Self::IdentityInactive => Some(SessionInvalidReason::IdentityInactive),
            Self::Store { .. } => None,
        }
    }
}

impl From<AuthError> for RedeemError {
    fn from(source: AuthError) -> Self {
        Self::Store { source }
    }
}

impl From<DbError> for RedeemError {
    #[track_caller]
    fn from(source: DbError) -> Self {
        Self::Store {
            source: AuthError::from(source),
        }
    }
}

impl From<RedeemError> for AuthError {
    #[track_caller]
    fn from(err: RedeemError) -> Self {
        match err.reason() {
            Some(reason) => AuthError::session_invalid(reason),
            None => match err {
                RedeemError::Store { source } => source,
                _ => AuthError::internal("unclassified redeem failure"),
            },
        }
    }
}

/// Result of revoking a presented secret at logout
#[derive(Debug)]
pub enum RevokeOutcome {
    /// The record was the active tip and is now revoked
    Revoked(RefreshTokenRecord),
    /// The record was already revoked or rotated; nothing changed
    AlreadyInactive(RefreshTokenRecord),
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    tokens: RefreshTokenRepository,
    identities: IdentityRepository,
    issuer: Arc<TokenIssuer>,
    audit: SecurityAuditLog,
    clock: Arc<dyn Clock>,
    reuse_policy: ReusePolicy,
    metrics: AuthMetrics,
}

impl RefreshTokenStore {
    pub fn new(
        tokens: RefreshTokenRepository,
        identities: IdentityRepository,
        issuer: Arc<TokenIssuer>,
        audit: SecurityAuditLog,
        clock: Arc<dyn Clock>,
        reuse_policy: ReusePolicy,
        metrics: AuthMetrics,
    ) -> Self {
        Self {
            tokens,
            identities,
            issuer,
            audit,
            clock,
            reuse_policy,
            metrics,
        }
    }

    /// Start a new session chain for `identity`
    pub async fn issue(
        &self,
        identity: &Identity,
        fingerprint: ClientFingerprint,
    ) -> AuthErrorResult<(RawRefreshSecret, RefreshTokenRecord)> {
        let (secret, record) = self.issuer.issue_refresh_token(
            identity.id,
            Uuid::new_v4(),
            fingerprint,
            self.clock.now(),
        );
        self.tokens.create(&record).await?;

        Ok((secret, record))
    }

    /// Exchange a refresh secret for a new access token and the next secret
    /// of the same chain.
    pub async fn redeem(
        &self,
        raw_secret: &str,
        fingerprint: ClientFingerprint,
    ) -> Result<Redeemed, RedeemError> {
        let now = self.clock.now();

        let Some(record) = self.tokens.find_by_hash(&hash_secret(raw_secret)).await? else {
            return Err(RedeemError::NotFound);
        };

        match record.state_at(now) {
            RefreshTokenState::Expired => return Err(RedeemError::Expired),
            state @ (RefreshTokenState::Revoked | RefreshTokenState::Rotated) => {
                return Err(self.contain_reuse(&record, state, &fingerprint, now).await);
            }
            RefreshTokenState::Active => {}
        }

        let identity = match self.identities.find_by_id(record.identity_id).await? {
            Some(identity) if identity.is_active => identity,
            _ => {
                self.tokens.revoke_if_active(record.id, now).await?;
                warn!(
                    "Refresh refused for inactive identity {}, token {} revoked",
                    record.identity_id, record.id
                );
                self.audit.record(
                    SecurityLogEntry::new(SecurityEventKind::TokenRevoked, &fingerprint.ip_address, now)
                        .with_actor(record.identity_id)
                        .with_context(json!({
                            "token_id": record.id,
                            "session_id": record.session_id,
                            "reason": "identity_inactive",
                        })),
                );
                return Err(RedeemError::IdentityInactive);
            }
        };

        let (secret, successor) =
            self.issuer
                .issue_refresh_token(identity.id, record.session_id, fingerprint.clone(), now);

        match self.tokens.rotate(record.id, &successor).await? {
            RotateOutcome::Rotated => {}
            RotateOutcome::Conflict => {
                // Lost the race: the presented link changed between read and write
                let current = self.tokens.find_by_id(record.id).await?.unwrap_or(record);
                let state = match current.state_at(now) {
                    RefreshTokenState::Revoked => RefreshTokenState::Revoked,
                    _ => RefreshTokenState::Rotated,
                };
                return Err(self.contain_reuse(&current, state, &fingerprint, now).await);
            }
        }

        let access_token = self.issuer.issue_access_token(&identity, now)?;

        Ok(Redeemed {
            identity,
            access_token,
            refresh_secret: secret,
            record: successor,
            previous_id: record.id,
        })
    }

    /// Revoke the record behind a presented secret if it is still the tip
    pub async fn revoke(&self, raw_secret: &str) -> Result<RevokeOutcome, RedeemError> {
        let now = self.clock.now();

        let Some(record) = self.tokens.find_by_hash(&hash_secret(raw_secret)).await? else {
            return Err(RedeemError::NotFound);
        };

        if self.tokens.revoke_if_active(record.id, now).await? {
            Ok(RevokeOutcome::Revoked(record))
        } else {
            Ok(RevokeOutcome::AlreadyInactive(record))
        }
    }

    async fn contain_reuse(
        &self,
        record: &RefreshTokenRecord,
        presented: RefreshTokenState,
        fingerprint: &ClientFingerprint,
        now: DateTime<Utc>,
    ) -> RedeemError {
        let chain = match self.tokens.revoke_chain_from(record.id, now).await {
            Ok(chain) => chain,
            Err(e) => return RedeemError::from(e),
        };

        let mut other_sessions_revoked = 0;
        if self.reuse_policy == ReusePolicy::AllSessions {
            match self.tokens.revoke_all_for_identity(record.identity_id, now).await {
                Ok(count) => other_sessions_revoked = count,
                Err(e) => return RedeemError::from(e),
            }
        }

        self.metrics.reuse_detected(chain.len());
        error!(
            "Refresh token reuse on session {} of identity {}: revoked {} links",
            record.session_id,
            record.identity_id,
            chain.len()
        );
        if other_sessions_revoked > 0 {
            info!(
                "Reuse policy {} revoked {} further tokens",
                self.reuse_policy, other_sessions_revoked
            );
        }

        self.audit.record(
            SecurityLogEntry::new(
                SecurityEventKind::RefreshReuseDetected,
                &fingerprint.ip_address,
                now,
            )
            .with_actor(record.identity_id)
            .with_context(json!({
                "session_id": record.session_id,
                "presented_token_id": record.id,
                "presented_state": presented.as_str(),
                "revoked_chain": chain,
                "reuse_policy": self.reuse_policy.as_str(),
                "other_tokens_revoked": other_sessions_revoked,
                "user_agent": fingerprint.user_agent,
            })),
        );

        RedeemError::ReuseDetected { chain, presented }
    }
}
