use crate::{AuthError, Result as AuthErrorResult};

use ag_core::Role;

use std::panic::Location;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const EMAIL_VERIFICATION_TOKEN_TYPE: &str = "email_verification";

/// Fields every token minted here carries, whatever its purpose
pub trait TokenClaims {
    fn subject(&self) -> &str;
    fn token_type(&self) -> &str;

    /// Reject a correctly signed token minted for another purpose
    #[track_caller]
    fn ensure_type(&self, expected: &str) -> AuthErrorResult<()> {
        if self.token_type() != expected {
            return Err(AuthError::Unauthorized {
                message: format!("expected a {expected} token"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    #[track_caller]
    fn identity_id(&self) -> AuthErrorResult<Uuid> {
        let caller = Location::caller();
        Uuid::parse_str(self.subject()).map_err(|_| AuthError::Unauthorized {
            message: "token subject is not an identity".to_string(),
            location: ErrorLocation::from(caller),
        })
    }
}

/// Access token claims, verified at the resource boundary without a store lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    pub typ: String,
    pub iss: String,
}

impl TokenClaims for Claims {
    fn subject(&self) -> &str {
        &self.sub
    }

    fn token_type(&self) -> &str {
        &self.typ
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerificationClaims {
    pub sub: String,
    /// Address the link was sent to; a later email change invalidates it
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub typ: String,
    pub iss: String,
}

impl TokenClaims for EmailVerificationClaims {
    fn subject(&self) -> &str {
        &self.sub
    }

    fn token_type(&self) -> &str {
        &self.typ
    }
}
