use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_BCRYPT_COST,
    DEFAULT_EMAIL_VERIFICATION_TTL_SECS, DEFAULT_ISSUER, DEFAULT_REFRESH_TOKEN_TTL_SECS,
    MAX_BCRYPT_COST, MIN_BCRYPT_COST, MIN_JWT_SECRET_LENGTH,
};

use ag_core::ReusePolicy;

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: Option<String>,
    /// RS256 key pair, paths relative to the config directory
    pub jwt_private_key_path: Option<String>,
    pub jwt_public_key_path: Option<String>,
    pub issuer: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub email_verification_ttl_secs: u64,
    pub reuse_policy: ReusePolicy,
    pub require_verified_email: bool,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_private_key_path: None,
            jwt_public_key_path: None,
            issuer: String::from(DEFAULT_ISSUER),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            email_verification_ttl_secs: DEFAULT_EMAIL_VERIFICATION_TTL_SECS,
            reuse_policy: ReusePolicy::default(),
            require_verified_email: false,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_private_key_path", &self.jwt_private_key_path)
            .field("jwt_public_key_path", &self.jwt_public_key_path)
            .field("issuer", &self.issuer)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("email_verification_ttl_secs", &self.email_verification_ttl_secs)
            .field("reuse_policy", &self.reuse_policy)
            .field("require_verified_email", &self.require_verified_email)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AuthConfig {
    /// "HS256", "RS256" or "none"
    pub fn algorithm_name(&self) -> &'static str {
        if self.jwt_secret.is_some() {
            "HS256"
        } else if self.jwt_private_key_path.is_some() || self.jwt_public_key_path.is_some() {
            "RS256"
        } else {
            "none"
        }
    }

    pub fn validate(&self, config_dir: &Path) -> ConfigErrorResult<()> {
        let has_keys = self.jwt_private_key_path.is_some() || self.jwt_public_key_path.is_some();

        match (&self.jwt_secret, has_keys) {
            (Some(_), true) => {
                return Err(ConfigError::auth(
                    "set either auth.jwt_secret or the RS256 key paths, not both",
                ));
            }
            (Some(secret), false) => {
                if secret.len() < MIN_JWT_SECRET_LENGTH {
                    return Err(ConfigError::auth(format!(
                        "auth.jwt_secret must be at least {MIN_JWT_SECRET_LENGTH} characters"
                    )));
                }
            }
            (None, true) => {
                let (Some(private), Some(public)) =
                    (&self.jwt_private_key_path, &self.jwt_public_key_path)
                else {
                    return Err(ConfigError::auth(
                        "RS256 needs both auth.jwt_private_key_path and auth.jwt_public_key_path",
                    ));
                };
                for path in [private, public] {
                    let resolved = Self::resolve(config_dir, path);
                    if !resolved.exists() {
                        return Err(ConfigError::auth(format!(
                            "JWT key file not found: {}",
                            resolved.display()
                        )));
                    }
                }
            }
            (None, false) => {
                return Err(ConfigError::auth(
                    "auth.jwt_secret or auth.jwt_private_key_path/jwt_public_key_path is required",
                ));
            }
        }

        if self.issuer.trim().is_empty() {
            return Err(ConfigError::auth("auth.issuer cannot be empty"));
        }

        for (field, value) in [
            ("access_token_ttl_secs", self.access_token_ttl_secs),
            ("refresh_token_ttl_secs", self.refresh_token_ttl_secs),
            ("email_verification_ttl_secs", self.email_verification_ttl_secs),
        ] {
            if value == 0 || value > i64::MAX as u64 / 1000 {
                return Err(ConfigError::auth(format!(
                    "auth.{field} must be a positive number of seconds, got {value}"
                )));
            }
        }
        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(ConfigError::auth(
                "auth.refresh_token_ttl_secs must be longer than auth.access_token_ttl_secs",
            ));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::auth(format!(
                "auth.bcrypt_cost must be {}-{}, got {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST, self.bcrypt_cost
            )));
        }

        Ok(())
    }

    /// Key paths are relative to the config directory unless absolute
    pub fn resolve(config_dir: &Path, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            config_dir.join(path)
        }
    }
}
