use crate::claims::{ACCESS_TOKEN_TYPE, EMAIL_VERIFICATION_TOKEN_TYPE};
use crate::{
    AuthError, Claims, EmailVerificationClaims, JwtAlgorithm, OpaqueSecret, RawRefreshSecret,
    Result as AuthErrorResult,
};

use ag_core::{ClientFingerprint, Identity, RefreshTokenRecord};

use std::panic::Location;

use chrono::{DateTime, Duration, Utc};
use error_location::ErrorLocation;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use uuid::Uuid;

/// How long each kind of token lives
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub email_verification: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            email_verification: Duration::hours(24),
        }
    }
}

/// A signed access token and the instant it stops being accepted
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints access JWTs, refresh secrets and email verification JWTs.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    header: Header,
    issuer: String,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    #[track_caller]
    pub fn new(
        algorithm: &JwtAlgorithm,
        issuer: impl Into<String>,
        lifetimes: TokenLifetimes,
    ) -> AuthErrorResult<Self> {
        let (encoding_key, alg) = match algorithm {
            JwtAlgorithm::HS256 { secret } => (EncodingKey::from_secret(secret), Algorithm::HS256),
            JwtAlgorithm::RS256 {
                private_key_pem, ..
            } => {
                let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
                    AuthError::Internal {
                        message: format!("Invalid RSA private key: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;
                (key, Algorithm::RS256)
            }
        };

        Ok(Self {
            encoding_key,
            header: Header::new(alg),
            issuer: issuer.into(),
            lifetimes,
        })
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn issue_access_token(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> AuthErrorResult<AccessToken> {
        let expires_at = now + self.lifetimes.access;
        let claims = Claims {
            sub: identity.id.to_string(),
            role: identity.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            typ: ACCESS_TOKEN_TYPE.to_string(),
            iss: self.issuer.clone(),
        };

        Ok(AccessToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    /// Generate a refresh secret and the record that will represent it.
    ///
    /// Nothing is persisted here; the caller stores the record, either as the
    /// first link of a new session or as the successor in a rotation.
    pub fn issue_refresh_token(
        &self,
        identity_id: Uuid,
        session_id: Uuid,
        fingerprint: ClientFingerprint,
        now: DateTime<Utc>,
    ) -> (RawRefreshSecret, RefreshTokenRecord) {
        let secret = OpaqueSecret::generate();
        let record = RefreshTokenRecord::new(
            identity_id,
            session_id,
            secret.digest(),
            now,
            now + self.lifetimes.refresh,
            fingerprint,
        );

        (secret, record)
    }

    pub fn issue_email_verification_token(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> AuthErrorResult<String> {
        let claims = EmailVerificationClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetimes.email_verification).timestamp(),
            typ: EMAIL_VERIFICATION_TOKEN_TYPE.to_string(),
            iss: self.issuer.clone(),
        };

        self.sign(&claims)
    }

    #[track_caller]
    fn sign<T: Serialize>(&self, claims: &T) -> AuthErrorResult<String> {
        Ok(encode(&self.header, claims, &self.encoding_key)?)
    }
}
