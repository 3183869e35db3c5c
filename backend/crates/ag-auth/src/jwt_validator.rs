use crate::claims::{ACCESS_TOKEN_TYPE, EMAIL_VERIFICATION_TOKEN_TYPE, TokenClaims};
use crate::{AuthError, Claims, EmailVerificationClaims, JwtAlgorithm, Result as AuthErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;

/// Clock skew tolerated on `exp`
const LEEWAY_SECS: u64 = 30;

/// Verifies tokens minted by [`crate::TokenIssuer`] with the same key material
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    algorithm: Algorithm,
}

impl JwtValidator {
    #[track_caller]
    pub fn new(algorithm: &JwtAlgorithm, issuer: &str) -> AuthErrorResult<Self> {
        let (decoding_key, alg) = match algorithm {
            JwtAlgorithm::HS256 { secret } => (DecodingKey::from_secret(secret), Algorithm::HS256),
            JwtAlgorithm::RS256 { public_key_pem, .. } => {
                let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes()).map_err(|e| {
                    AuthError::Internal {
                        message: format!("Invalid RSA public key: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;
                (key, Algorithm::RS256)
            }
        };

        let mut validation = Validation::new(alg);
        validation.validate_exp = true;
        validation.leeway = LEEWAY_SECS;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Ok(Self {
            decoding_key,
            validation,
            algorithm: alg,
        })
    }

    /// Validate a bearer token and return its claims
    #[track_caller]
    pub fn validate_access(&self, token: &str) -> AuthErrorResult<Claims> {
        self.decode(token, ACCESS_TOKEN_TYPE)
    }

    #[track_caller]
    pub fn validate_email_verification(&self, token: &str) -> AuthErrorResult<EmailVerificationClaims> {
        self.decode(token, EMAIL_VERIFICATION_TOKEN_TYPE)
    }

    #[track_caller]
    fn decode<T>(&self, token: &str, expected_type: &str) -> AuthErrorResult<T>
    where
        T: DeserializeOwned + TokenClaims,
    {
        let caller = Location::caller();
        let token_data = decode::<T>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let message = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidIssuer => "token issuer mismatch",
                ErrorKind::InvalidSignature => "token signature invalid",
                _ => "token malformed",
            };
            AuthError::Unauthorized {
                message: message.to_string(),
                location: ErrorLocation::from(caller),
            }
        })?;

        token_data.claims.ensure_type(expected_type)?;

        Ok(token_data.claims)
    }

    /// Get the algorithm being used (for logging)
    pub fn algorithm(&self) -> &str {
        match self.algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::RS256 => "RS256",
            _ => "unknown",
        }
    }
}
