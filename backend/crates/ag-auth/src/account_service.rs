//! Registration, password reset, email verification and identity
//! administration.

use crate::claims::TokenClaims;
use crate::{
    AuthError, BruteforceGuard, Clock, CredentialVerifier, EmailSender, JwtValidator,
    OpaqueSecret, Result as AuthErrorResult, SecurityAuditLog, TokenIssuer,
};

use ag_core::validation::{normalize_email, validate_email, validate_password};
use ag_core::{
    AttemptKind, Identity, PasswordResetToken, Role, SecurityEventKind, SecurityLogEntry,
};
use ag_db::{
    DbError, IdentityRepository, PasswordResetRepository, RefreshTokenRepository,
    SecurityLogFilter, SecurityLogRepository,
};

use std::sync::Arc;

use chrono::Duration;
use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

/// Lifetime of a password reset secret
pub const PASSWORD_RESET_TTL_MINUTES: i64 = 15;

/// One page of a listing plus the total number of matching rows
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Clone)]
pub struct AccountService {
    identities: IdentityRepository,
    tokens: RefreshTokenRepository,
    resets: PasswordResetRepository,
    security_logs: SecurityLogRepository,
    guard: BruteforceGuard,
    verifier: CredentialVerifier,
    issuer: Arc<TokenIssuer>,
    validator: Arc<JwtValidator>,
    email: Arc<dyn EmailSender>,
    audit: SecurityAuditLog,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identities: IdentityRepository,
        tokens: RefreshTokenRepository,
        resets: PasswordResetRepository,
        security_logs: SecurityLogRepository,
        guard: BruteforceGuard,
        verifier: CredentialVerifier,
        issuer: Arc<TokenIssuer>,
        validator: Arc<JwtValidator>,
        email: Arc<dyn EmailSender>,
        audit: SecurityAuditLog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            tokens,
            resets,
            security_logs,
            guard,
            verifier,
            issuer,
            validator,
            email,
            audit,
            clock,
        }
    }

    /// Create an identity. The first one becomes superadmin, the second
    /// admin, the rest user.
    pub async fn register(&self, email: &str, password: &str, origin: &str) -> AuthErrorResult<Identity> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        let password_hash = self.verifier.hash_password(password).await?;
        let now = self.clock.now();
        let candidate = Identity::new(email.clone(), password_hash, Role::User, now);

        let identity = match self.identities.create_with_bootstrap_role(&candidate).await {
            Ok(identity) => identity,
            Err(DbError::Duplicate { .. }) => {
                return Err(AuthError::validation("Email already registered", Some("email")));
            }
            Err(e) => return Err(e.into()),
        };

        info!("Registered identity {} with role {}", identity.id, identity.role);
        self.audit.record(
            SecurityLogEntry::new(SecurityEventKind::Registered, origin, now)
                .with_actor(identity.id)
                .with_email(&identity.email)
                .with_context(json!({ "role": identity.role.as_str() })),
        );

        self.send_verification_to(&identity).await;

        Ok(identity)
    }

    /// Always succeeds for well-formed input so the response does not reveal
    /// whether the email is registered.
    pub async fn request_password_reset(&self, email: &str, origin: &str) -> AuthErrorResult<()> {
        let email = normalize_email(email);

        let Some(identity) = self.identities.find_by_email(&email).await? else {
            return Ok(());
        };
        if !identity.is_active {
            return Ok(());
        }

        let now = self.clock.now();
        let secret = OpaqueSecret::generate();
        let token = PasswordResetToken::new(
            identity.id,
            secret.digest(),
            now,
            now + Duration::minutes(PASSWORD_RESET_TTL_MINUTES),
        );
        self.resets.create(&token).await?;

        if let Err(e) = self.email.send_password_reset(&identity.email, secret.as_str()).await {
            warn!("Password reset email for {} not sent: {}", identity.id, e);
        }

        self.audit.record(
            SecurityLogEntry::new(SecurityEventKind::PasswordResetRequested, origin, now)
                .with_actor(identity.id)
                .with_email(&identity.email),
        );

        Ok(())
    }

    /// Consume a reset secret once, set the new password, end every session
    /// and clear the email lockout.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        origin: &str,
    ) -> AuthErrorResult<()> {
        validate_password(new_password)?;

        let now = self.clock.now();
        let token_hash = OpaqueSecret::from_raw(token).digest();

        let Some(identity_id) = self.resets.consume(&token_hash, now).await? else {
            return Err(AuthError::validation(
                "Invalid or expired reset token",
                Some("token"),
            ));
        };

        let identity = self.load(identity_id).await?;
        let password_hash = self.verifier.hash_password(new_password).await?;
        self.identities.update_password(identity.id, &password_hash).await?;

        let revoked = self.tokens.revoke_all_for_identity(identity.id, now).await?;
        self.guard
            .record_success(AttemptKind::LoginByEmail, &identity.email)
            .await?;

        info!("Password reset for identity {} ({} tokens revoked)", identity.id, revoked);
        self.audit
            .record_durable(
                SecurityLogEntry::new(SecurityEventKind::PasswordResetCompleted, origin, now)
                    .with_actor(identity.id)
                    .with_email(&identity.email)
                    .with_context(json!({ "tokens_revoked": revoked })),
            )
            .await;

        Ok(())
    }

    /// Send a fresh verification link. Unknown or already verified
    /// addresses are accepted silently.
    pub async fn send_verification(&self, email: &str) -> AuthErrorResult<()> {
        let email = normalize_email(email);

        let pending = self
            .identities
            .find_by_email(&email)
            .await?
            .filter(|identity| identity.is_active && !identity.is_verified);

        if let Some(identity) = pending {
            self.send_verification_to(&identity).await;
        }

        Ok(())
    }

    async fn send_verification_to(&self, identity: &Identity) {
        let token = match self
            .issuer
            .issue_email_verification_token(identity, self.clock.now())
        {
            Ok(token) => token,
            Err(e) => {
                warn!("Verification token for {} not issued: {}", identity.id, e);
                return;
            }
        };

        if let Err(e) = self.email.send_verification(&identity.email, &token).await {
            warn!("Verification email for {} not sent: {}", identity.id, e);
        }
    }

    pub async fn verify_email(&self, token: &str, origin: &str) -> AuthErrorResult<Identity> {
        let invalid = || AuthError::validation("Invalid or expired verification token", Some("token"));

        let claims = self
            .validator
            .validate_email_verification(token)
            .map_err(|_| invalid())?;
        let identity_id = claims.identity_id().map_err(|_| invalid())?;

        let mut identity = self
            .identities
            .find_by_id(identity_id)
            .await?
            .filter(|identity| identity.email == claims.email)
            .ok_or_else(invalid)?;

        if self.identities.mark_verified(identity.id).await? {
            identity.is_verified = true;
            self.audit
                .record_durable(
                    SecurityLogEntry::new(SecurityEventKind::EmailVerified, origin, self.clock.now())
                        .with_actor(identity.id)
                        .with_email(&identity.email),
                )
                .await;
        }

        Ok(identity)
    }

    pub async fn list_identities(&self, page: u32, limit: u32) -> AuthErrorResult<Page<Identity>> {
        let (offset, limit_i) = page_window(page, limit);
        let items = self.identities.list(offset, limit_i).await?;
        let total = self.identities.count().await?;

        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    pub async fn get_identity(&self, id: Uuid) -> AuthErrorResult<Identity> {
        self.load(id).await
    }

    pub async fn find_identity(&self, id: Uuid) -> AuthErrorResult<Option<Identity>> {
        Ok(self.identities.find_by_id(id).await?)
    }

    /// Change a role. Callers must already hold superadmin.
    pub async fn set_role(&self, actor: Uuid, target: Uuid, role: Role, origin: &str) -> AuthErrorResult<Identity> {
        let mut identity = self.load(target).await?;
        if actor == target {
            return Err(AuthError::validation("Cannot change your own role", Some("role")));
        }

        let previous = identity.role;
        self.identities.set_role(target, role).await?;
        identity.role = role;

        info!("Identity {} role {} -> {} by {}", target, previous, role, actor);
        self.audit
            .record_durable(
                SecurityLogEntry::new(SecurityEventKind::RoleChanged, origin, self.clock.now())
                    .with_actor(actor)
                    .with_email(&identity.email)
                    .with_context(json!({
                        "target_id": target,
                        "from": previous.as_str(),
                        "to": role.as_str(),
                    })),
            )
            .await;

        Ok(identity)
    }

    /// Disable an identity and revoke every refresh token it holds
    pub async fn disable(&self, actor: Uuid, target: Uuid, origin: &str) -> AuthErrorResult<Identity> {
        let mut identity = self.load(target).await?;
        if actor == target {
            return Err(AuthError::validation("Cannot disable your own account", Some("id")));
        }

        let now = self.clock.now();
        self.identities.set_active(target, false).await?;
        identity.is_active = false;
        let revoked = self.tokens.revoke_all_for_identity(target, now).await?;

        info!("Identity {} disabled by {} ({} tokens revoked)", target, actor, revoked);
        self.audit
            .record_durable(
                SecurityLogEntry::new(SecurityEventKind::AccountDisabled, origin, now)
                    .with_actor(actor)
                    .with_email(&identity.email)
                    .with_context(json!({ "target_id": target })),
            )
            .await;
        self.audit.record(
            SecurityLogEntry::new(SecurityEventKind::TokenRevoked, origin, now)
                .with_actor(actor)
                .with_context(json!({
                    "target_id": target,
                    "tokens_revoked": revoked,
                    "reason": "account_disabled",
                })),
        );

        Ok(identity)
    }

    pub async fn enable(&self, actor: Uuid, target: Uuid, origin: &str) -> AuthErrorResult<Identity> {
        let mut identity = self.load(target).await?;

        self.identities.set_active(target, true).await?;
        identity.is_active = true;

        info!("Identity {} enabled by {}", target, actor);
        self.audit
            .record_durable(
                SecurityLogEntry::new(SecurityEventKind::AccountEnabled, origin, self.clock.now())
                    .with_actor(actor)
                    .with_email(&identity.email)
                    .with_context(json!({ "target_id": target })),
            )
            .await;

        Ok(identity)
    }

    pub async fn list_security_logs(
        &self,
        filter: &SecurityLogFilter,
        page: u32,
        limit: u32,
    ) -> AuthErrorResult<Page<SecurityLogEntry>> {
        let (offset, limit_i) = page_window(page, limit);
        let (total, items) = self.security_logs.list(filter, offset, limit_i).await?;

        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    async fn load(&self, id: Uuid) -> AuthErrorResult<Identity> {
        self.identities
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::not_found(format!("Identity {id} not found")))
    }
}

/// 1-based page number to (offset, limit)
fn page_window(page: u32, limit: u32) -> (i64, i64) {
    let page = i64::from(page.max(1));
    let limit = i64::from(limit);
    ((page - 1) * limit, limit)
}
