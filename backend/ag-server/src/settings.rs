//! Turns the loaded configuration into service settings.

use crate::error::{Result as ServerErrorResult, ServerError};

use ag_auth::{AttemptPolicy, AuthSettings, JwtAlgorithm, RequestLimitConfig, TokenLifetimes};
use ag_config::{AttemptPolicyConfig, AuthConfig, Config};

use std::path::Path;

use chrono::Duration;

fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

pub fn attempt_policy(config: &AttemptPolicyConfig) -> AttemptPolicy {
    AttemptPolicy {
        max_attempts: config.max_attempts,
        window: seconds(config.window_secs),
        lockout: seconds(config.lockout_secs),
        max_lockout: seconds(config.max_lockout_secs),
        backoff: config.backoff,
    }
}

/// Signing material from the secret or the RS256 key files.
/// Relative key paths resolve against `config_dir`.
pub fn jwt_algorithm(auth: &AuthConfig, config_dir: &Path) -> ServerErrorResult<JwtAlgorithm> {
    if let Some(secret) = &auth.jwt_secret {
        return Ok(JwtAlgorithm::HS256 {
            secret: secret.as_bytes().to_vec(),
        });
    }

    let (Some(private), Some(public)) = (&auth.jwt_private_key_path, &auth.jwt_public_key_path)
    else {
        return Err(ag_config::ConfigError::auth("no JWT signing material configured").into());
    };

    let read = |path: &str| {
        let full_path = AuthConfig::resolve(config_dir, path);
        std::fs::read_to_string(&full_path).map_err(|e| ServerError::JwtKeyFile {
            path: full_path.display().to_string(),
            source: e,
        })
    };

    Ok(JwtAlgorithm::RS256 {
        private_key_pem: read(private)?,
        public_key_pem: read(public)?,
    })
}

pub fn auth_settings(config: &Config, config_dir: &Path) -> ServerErrorResult<AuthSettings> {
    Ok(AuthSettings {
        algorithm: jwt_algorithm(&config.auth, config_dir)?,
        issuer: config.auth.issuer.clone(),
        lifetimes: TokenLifetimes {
            access: seconds(config.auth.access_token_ttl_secs),
            refresh: seconds(config.auth.refresh_token_ttl_secs),
            email_verification: seconds(config.auth.email_verification_ttl_secs),
        },
        email_policy: attempt_policy(&config.bruteforce.email),
        ip_policy: attempt_policy(&config.bruteforce.ip),
        reuse_policy: config.auth.reuse_policy,
        require_verified_email: config.auth.require_verified_email,
        bcrypt_cost: config.auth.bcrypt_cost,
    })
}

pub fn request_limit(config: &Config) -> RequestLimitConfig {
    RequestLimitConfig {
        max_requests: config.request_limit.max_requests,
        window_secs: config.request_limit.window_secs,
    }
}
