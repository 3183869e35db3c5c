//! Login, refresh and logout.
//!
//! Callers only ever see `InvalidCredentials` or `SessionInvalid` for a
//! refused attempt; which check failed is recorded in the audit context.

use crate::error::SessionInvalidReason;
use crate::{
    AccessToken, AuthError, AuthMetrics, BruteforceGuard, Clock, CredentialVerifier,
    RawRefreshSecret, RedeemError, RefreshTokenStore, Result as AuthErrorResult, RevokeOutcome,
    SecurityAuditLog, TokenIssuer,
};

use ag_core::validation::normalize_email;
use ag_core::{AttemptKind, ClientFingerprint, Identity, SecurityEventKind, SecurityLogEntry};
use ag_db::IdentityRepository;

use std::panic::Location;
use std::sync::Arc;

use error_location::ErrorLocation;
use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

/// Tokens handed to the client after a login or refresh
#[derive(Debug)]
pub struct SessionTokens {
    pub identity: Identity,
    pub access_token: AccessToken,
    pub refresh_secret: RawRefreshSecret,
    pub session_id: Uuid,
}

#[derive(Clone)]
pub struct SessionFacade {
    identities: IdentityRepository,
    guard: BruteforceGuard,
    verifier: CredentialVerifier,
    issuer: Arc<TokenIssuer>,
    store: RefreshTokenStore,
    audit: SecurityAuditLog,
    clock: Arc<dyn Clock>,
    metrics: AuthMetrics,
    require_verified_email: bool,
}

impl SessionFacade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identities: IdentityRepository,
        guard: BruteforceGuard,
        verifier: CredentialVerifier,
        issuer: Arc<TokenIssuer>,
        store: RefreshTokenStore,
        audit: SecurityAuditLog,
        clock: Arc<dyn Clock>,
        metrics: AuthMetrics,
        require_verified_email: bool,
    ) -> Self {
        Self {
            identities,
            guard,
            verifier,
            issuer,
            store,
            audit,
            clock,
            metrics,
            require_verified_email,
        }
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientFingerprint,
    ) -> AuthErrorResult<SessionTokens> {
        let email = normalize_email(email);
        let origin = client.ip_address.as_str();

        self.guard.admit(AttemptKind::LoginByEmail, &email, origin).await?;
        self.guard.admit(AttemptKind::LoginByIp, origin, origin).await?;

        let identity = self.identities.find_by_email(&email).await?;
        let password_ok = self.verifier.verify(identity.as_ref(), password).await?;

        let identity = match (identity, password_ok) {
            (Some(identity), true) => identity,
            (Some(identity), false) => {
                return Err(self
                    .reject_login(&email, Some(identity.id), origin, "wrong_password")
                    .await);
            }
            (None, _) => {
                return Err(self
                    .reject_login(&email, None, origin, "unknown_identity")
                    .await);
            }
        };

        if !identity.is_active {
            warn!("Login refused for disabled identity {}", identity.id);
            self.audit.record(
                SecurityLogEntry::new(SecurityEventKind::LoginFailure, origin, self.clock.now())
                    .with_actor(identity.id)
                    .with_email(&email)
                    .with_context(json!({ "reason": "account_disabled" })),
            );
            return Err(AuthError::AccountDisabled {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.require_verified_email && !identity.is_verified {
            return Err(self
                .reject_login(&email, Some(identity.id), origin, "email_not_verified")
                .await);
        }

        self.guard.record_success(AttemptKind::LoginByEmail, &email).await?;

        let (refresh_secret, record) = self.store.issue(&identity, client.clone()).await?;
        let now = self.clock.now();
        let access_token = self.issuer.issue_access_token(&identity, now)?;

        self.metrics.login_succeeded();
        info!("Login for identity {} (session {})", identity.id, record.session_id);
        self.audit
            .record_durable(
                SecurityLogEntry::new(SecurityEventKind::LoginSuccess, origin, now)
                    .with_actor(identity.id)
                    .with_email(&email)
                    .with_context(json!({
                        "session_id": record.session_id,
                        "user_agent": client.user_agent,
                    })),
            )
            .await;

        Ok(SessionTokens {
            identity,
            access_token,
            refresh_secret,
            session_id: record.session_id,
        })
    }

    /// Count the failure against both keys and record why it failed.
    async fn reject_login(
        &self,
        email: &str,
        actor: Option<Uuid>,
        origin: &str,
        reason: &str,
    ) -> AuthError {
        if let Err(e) = self.guard.record_failure(AttemptKind::LoginByEmail, email).await {
            return e;
        }
        if let Err(e) = self.guard.record_failure(AttemptKind::LoginByIp, origin).await {
            return e;
        }

        self.metrics.login_failed();

        let mut entry =
            SecurityLogEntry::new(SecurityEventKind::LoginFailure, origin, self.clock.now())
                .with_email(email)
                .with_context(json!({ "reason": reason }));
        if let Some(actor) = actor {
            entry = entry.with_actor(actor);
        }
        self.audit.record(entry);

        AuthError::invalid_credentials()
    }

    pub async fn refresh(
        &self,
        raw_secret: &str,
        client: &ClientFingerprint,
    ) -> AuthErrorResult<SessionTokens> {
        let origin = client.ip_address.as_str();

        self.guard.admit(AttemptKind::LoginByIp, origin, origin).await?;

        let redeemed = match self.store.redeem(raw_secret, client.clone()).await {
            Ok(redeemed) => redeemed,
            Err(RedeemError::Store { source }) => return Err(source),
            Err(e) => {
                let reason = e.reason().unwrap_or(SessionInvalidReason::NotFound);
                return Err(self.reject_refresh(origin, reason).await);
            }
        };

        self.metrics.refresh_succeeded();
        self.audit
            .record_durable(
                SecurityLogEntry::new(SecurityEventKind::RefreshSuccess, origin, self.clock.now())
                    .with_actor(redeemed.identity.id)
                    .with_context(json!({
                        "session_id": redeemed.record.session_id,
                        "previous_token_id": redeemed.previous_id,
                        "token_id": redeemed.record.id,
                    })),
            )
            .await;

        Ok(SessionTokens {
            session_id: redeemed.record.session_id,
            identity: redeemed.identity,
            access_token: redeemed.access_token,
            refresh_secret: redeemed.refresh_secret,
        })
    }

    async fn reject_refresh(&self, origin: &str, reason: SessionInvalidReason) -> AuthError {
        if let Err(e) = self.guard.record_failure(AttemptKind::LoginByIp, origin).await {
            return e;
        }

        self.metrics.refresh_failed(reason.as_str());
        warn!("Refresh refused from {}: {}", origin, reason);

        // Reuse has its own event, written during containment
        if !matches!(
            reason,
            SessionInvalidReason::ReuseDetected | SessionInvalidReason::Revoked
        ) {
            self.audit.record(
                SecurityLogEntry::new(SecurityEventKind::RefreshFailure, origin, self.clock.now())
                    .with_context(json!({ "reason": reason.as_str() })),
            );
        }

        AuthError::session_invalid(reason)
    }

    /// Revoke the session behind `raw_secret`.
    ///
    /// A secret that is already revoked or rotated is a successful no-op;
    /// an unknown secret is `SessionInvalid`.
    pub async fn logout(&self, raw_secret: &str, client: &ClientFingerprint) -> AuthErrorResult<()> {
        let origin = client.ip_address.as_str();

        self.guard.admit(AttemptKind::LoginByIp, origin, origin).await?;

        let now = self.clock.now();
        match self.store.revoke(raw_secret).await {
            Ok(RevokeOutcome::Revoked(record)) => {
                info!("Logout for identity {} (session {})", record.identity_id, record.session_id);
                self.audit
                    .record_durable(
                        SecurityLogEntry::new(SecurityEventKind::Logout, origin, now)
                            .with_actor(record.identity_id)
                            .with_context(json!({ "session_id": record.session_id })),
                    )
                    .await;
                self.audit.record(
                    SecurityLogEntry::new(SecurityEventKind::TokenRevoked, origin, now)
                        .with_actor(record.identity_id)
                        .with_context(json!({
                            "token_id": record.id,
                            "session_id": record.session_id,
                            "reason": "logout",
                        })),
                );
                Ok(())
            }
            Ok(RevokeOutcome::AlreadyInactive(record)) => {
                self.audit.record(
                    SecurityLogEntry::new(SecurityEventKind::Logout, origin, now)
                        .with_actor(record.identity_id)
                        .with_context(json!({
                            "session_id": record.session_id,
                            "already_inactive": true,
                        })),
                );
                Ok(())
            }
            Err(RedeemError::Store { source }) => Err(source),
            Err(_) => {
                if let Err(e) = self.guard.record_failure(AttemptKind::LoginByIp, origin).await {
                    return Err(e);
                }
                warn!("Logout with unknown refresh secret from {}", origin);
                Err(AuthError::session_invalid(SessionInvalidReason::NotFound))
            }
        }
    }
}
