use crate::{
    AccountService, AttemptPolicy, AuthMetrics, BruteforceGuard, Clock, CredentialVerifier,
    EmailSender, JwtAlgorithm, JwtValidator, RefreshTokenStore, Result as AuthErrorResult,
    SecurityAuditLog, SessionFacade, TokenIssuer, TokenLifetimes,
};

use ag_core::ReusePolicy;
use ag_db::{
    AttemptCounterRepository, IdentityRepository, PasswordResetRepository,
    RefreshTokenRepository, SecurityLogRepository,
};

use std::sync::Arc;

use sqlx::SqlitePool;

/// Everything needed to assemble the authentication services
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub algorithm: JwtAlgorithm,
    pub issuer: String,
    pub lifetimes: TokenLifetimes,
    pub email_policy: AttemptPolicy,
    pub ip_policy: AttemptPolicy,
    pub reuse_policy: ReusePolicy,
    pub require_verified_email: bool,
    pub bcrypt_cost: u32,
}

impl AuthSettings {
    /// HS256 settings with default lifetimes and policies
    pub fn with_hs256_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm: JwtAlgorithm::HS256 {
                secret: secret.into(),
            },
            issuer: "authgate".to_string(),
            lifetimes: TokenLifetimes::default(),
            email_policy: AttemptPolicy::email_default(),
            ip_policy: AttemptPolicy::ip_default(),
            reuse_policy: ReusePolicy::default(),
            require_verified_email: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// The wired-up service graph over one database pool
#[derive(Clone)]
pub struct AuthServices {
    pub sessions: SessionFacade,
    pub accounts: AccountService,
    pub guard: BruteforceGuard,
    pub store: RefreshTokenStore,
    pub audit: SecurityAuditLog,
    pub issuer: Arc<TokenIssuer>,
    pub validator: Arc<JwtValidator>,
}

impl AuthServices {
    pub fn build(
        pool: SqlitePool,
        settings: &AuthSettings,
        clock: Arc<dyn Clock>,
        email: Arc<dyn EmailSender>,
    ) -> AuthErrorResult<Self> {
        let metrics = AuthMetrics::new();

        let identities = IdentityRepository::new(pool.clone());
        let tokens = RefreshTokenRepository::new(pool.clone());
        let security_logs = SecurityLogRepository::new(pool.clone());

        let audit = SecurityAuditLog::new(security_logs.clone(), metrics.clone());
        let issuer = Arc::new(TokenIssuer::new(
            &settings.algorithm,
            settings.issuer.clone(),
            settings.lifetimes,
        )?);
        let validator = Arc::new(JwtValidator::new(&settings.algorithm, &settings.issuer)?);
        let verifier = CredentialVerifier::new(settings.bcrypt_cost, metrics.clone())?;

        let guard = BruteforceGuard::new(
            AttemptCounterRepository::new(pool.clone()),
            audit.clone(),
            clock.clone(),
            settings.email_policy,
            settings.ip_policy,
            metrics.clone(),
        );

        let store = RefreshTokenStore::new(
            tokens.clone(),
            identities.clone(),
            issuer.clone(),
            audit.clone(),
            clock.clone(),
            settings.reuse_policy,
            metrics.clone(),
        );

        let sessions = SessionFacade::new(
            identities.clone(),
            guard.clone(),
            verifier.clone(),
            issuer.clone(),
            store.clone(),
            audit.clone(),
            clock.clone(),
            metrics,
            settings.require_verified_email,
        );

        let accounts = AccountService::new(
            identities,
            tokens,
            PasswordResetRepository::new(pool),
            security_logs,
            guard.clone(),
            verifier,
            issuer.clone(),
            validator.clone(),
            email,
            audit.clone(),
            clock,
        );

        Ok(Self {
            sessions,
            accounts,
            guard,
            store,
            audit,
            issuer,
            validator,
        })
    }
}
