pub mod account_service;
pub mod attempt_policy;
pub mod audit;
pub mod authorization;
pub mod bruteforce_guard;
pub mod claims;
pub mod clock;
pub mod credential_verifier;
pub mod email;
pub mod error;
pub mod jwt_algorithm;
pub mod jwt_validator;
pub mod metrics;
pub mod refresh_token_store;
pub mod request_limiter;
pub mod secret;
pub mod services;
pub mod session_facade;
pub mod token_issuer;

pub use account_service::{AccountService, Page};
pub use attempt_policy::AttemptPolicy;
pub use audit::SecurityAuditLog;
pub use authorization::require_role;
pub use bruteforce_guard::{BruteforceGuard, GuardDecision};
pub use claims::{Claims, EmailVerificationClaims, TokenClaims};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credential_verifier::CredentialVerifier;
pub use email::{EmailSender, LogEmailSender};
pub use error::{AuthError, Result, SessionInvalidReason};
pub use jwt_algorithm::JwtAlgorithm;
pub use jwt_validator::JwtValidator;
pub use metrics::AuthMetrics;
pub use refresh_token_store::{RedeemError, Redeemed, RefreshTokenStore, RevokeOutcome};
pub use request_limiter::{RequestLimitConfig, RequestLimiter};
pub use secret::{OpaqueSecret, RawRefreshSecret, hash_secret};
pub use services::{AuthServices, AuthSettings};
pub use session_facade::{SessionFacade, SessionTokens};
pub use token_issuer::{AccessToken, TokenIssuer, TokenLifetimes};

#[cfg(test)]
mod tests;
