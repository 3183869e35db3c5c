use crate::{AuthError, AuthMetrics, Result as AuthErrorResult};

use ag_core::Identity;

use std::panic::Location;
use std::time::Instant;

use error_location::ErrorLocation;

/// Plaintext for the hash checked when no identity matches the email
const DUMMY_PASSWORD: &str = "authgate-timing-equalizer";

/// bcrypt password hashing and verification.
///
/// bcrypt is CPU-bound, so both operations run on the blocking pool.
#[derive(Clone)]
pub struct CredentialVerifier {
    cost: u32,
    dummy_hash: String,
    metrics: AuthMetrics,
}

impl CredentialVerifier {
    #[track_caller]
    pub fn new(cost: u32, metrics: AuthMetrics) -> AuthErrorResult<Self> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost).map_err(|e| AuthError::PasswordHash {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            cost,
            dummy_hash,
            metrics,
        })
    }

    pub async fn hash_password(&self, password: &str) -> AuthErrorResult<String> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::internal(format!("hashing task failed: {e}")))?
            .map_err(|e| AuthError::PasswordHash {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Check `password` against the identity's stored hash.
    ///
    /// With no identity the dummy hash is checked instead and the answer is
    /// always false, so an unknown email costs the same as a wrong password.
    pub async fn verify(&self, identity: Option<&Identity>, password: &str) -> AuthErrorResult<bool> {
        let (hash, known) = match identity {
            Some(identity) => (identity.password_hash.clone(), true),
            None => (self.dummy_hash.clone(), false),
        };
        let password = password.to_string();

        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::internal(format!("verification task failed: {e}")))?;
        self.metrics.password_verify_latency(started.elapsed());

        let matches = result.map_err(|e| AuthError::PasswordHash {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(known && matches)
    }
}
