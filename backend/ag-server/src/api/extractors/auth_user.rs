use crate::{ApiError, AppState};

use ag_auth::{TokenClaims, require_role};
use ag_core::{Identity, Role};

use std::future::Future;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use log::debug;

/// The identity behind a valid `Authorization: Bearer <jwt>` header.
///
/// The identity is re-read from the store so a disabled account or a
/// changed role takes effect before the access token expires.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    /// Reject with 403 unless the caller holds at least `required`
    pub fn require(&self, required: Role) -> Result<(), ApiError> {
        require_role(self.0.role, required).map_err(ApiError::from)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(parts).map(String::from);
        let state = state.clone();

        async move {
            let Some(token) = token else {
                return Err(ApiError::unauthorized("Missing bearer token"));
            };

            let claims = state
                .services
                .validator
                .validate_access(&token)
                .map_err(|e| state.api_error(e))?;
            let identity_id = claims.identity_id().map_err(|e| state.api_error(e))?;

            let identity = state
                .services
                .accounts
                .find_identity(identity_id)
                .await
                .map_err(|e| state.api_error(e))?;

            match identity {
                Some(identity) if identity.is_active => Ok(AuthUser(identity)),
                Some(identity) => {
                    debug!("Bearer token for disabled identity {}", identity.id);
                    Err(ApiError::unauthorized("Account disabled"))
                }
                None => Err(ApiError::unauthorized("Unknown identity")),
            }
        }
    }
}
