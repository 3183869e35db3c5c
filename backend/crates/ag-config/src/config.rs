use crate::{
    AuthConfig, BruteforceConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, DatabaseConfig, Environment, LoggingConfig, RequestLimitConfig,
    ServerConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub bruteforce: BruteforceConfig,
    pub request_limit: RequestLimitConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// 1. `AG_CONFIG_DIR`, else `./.authgate/`, created if missing
    /// 2. `config.toml` in that directory if present, else defaults
    /// 3. `AG_*` environment overrides
    ///
    /// Does not validate; call `validate()` afterwards.
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `AG_CONFIG_DIR` if set, else `.authgate` under the working directory
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Check every section. Call after `load()` so bad settings stop startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let config_dir = Self::config_dir()?;

        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&config_dir)?;
        self.bruteforce.validate()?;
        self.request_limit.validate()?;

        Ok(())
    }

    pub fn database_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.database.path))
    }

    /// Log file path when file logging is enabled
    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        let Some(file) = &self.logging.file else {
            return Ok(None);
        };
        Ok(Some(Self::config_dir()?.join(&self.logging.dir).join(file)))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log the effective configuration. Secrets are never printed.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  environment: {}", self.environment);
        info!(
            "  server: {}:{} (trust proxy headers: {})",
            self.server.host, self.server.port, self.server.trust_proxy_headers
        );
        info!("  database: {}", self.database.path);
        info!(
            "  auth: {} issuer={} access={}s refresh={}s verification={}s reuse_policy={} require_verified_email={}",
            self.auth.algorithm_name(),
            self.auth.issuer,
            self.auth.access_token_ttl_secs,
            self.auth.refresh_token_ttl_secs,
            self.auth.email_verification_ttl_secs,
            self.auth.reuse_policy,
            self.auth.require_verified_email
        );
        for (name, policy) in [("email", &self.bruteforce.email), ("ip", &self.bruteforce.ip)] {
            info!(
                "  bruteforce.{}: {} attempts/{}s, lockout {}s (max {}s, {})",
                name,
                policy.max_attempts,
                policy.window_secs,
                policy.lockout_secs,
                policy.max_lockout_secs,
                policy.backoff
            );
        }
        info!(
            "  request_limit: {}/{}s",
            self.request_limit.max_requests, self.request_limit.window_secs
        );
        info!(
            "  logging: {} (colored: {}, file: {})",
            self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("none")
        );
    }

    fn apply_env_overrides(&mut self) {
        Self::apply_env_parse("AG_ENVIRONMENT", &mut self.environment);

        // Server
        Self::apply_env_string("AG_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("AG_SERVER_PORT", &mut self.server.port);
        Self::apply_env_bool(
            "AG_SERVER_TRUST_PROXY_HEADERS",
            &mut self.server.trust_proxy_headers,
        );

        // Database
        Self::apply_env_string("AG_DATABASE_PATH", &mut self.database.path);

        // Auth
        Self::apply_env_option_string("AG_AUTH_JWT_SECRET", &mut self.auth.jwt_secret);
        Self::apply_env_option_string(
            "AG_AUTH_JWT_PRIVATE_KEY_PATH",
            &mut self.auth.jwt_private_key_path,
        );
        Self::apply_env_option_string(
            "AG_AUTH_JWT_PUBLIC_KEY_PATH",
            &mut self.auth.jwt_public_key_path,
        );
        Self::apply_env_string("AG_AUTH_ISSUER", &mut self.auth.issuer);
        Self::apply_env_parse(
            "AG_AUTH_ACCESS_TOKEN_TTL_SECS",
            &mut self.auth.access_token_ttl_secs,
        );
        Self::apply_env_parse(
            "AG_AUTH_REFRESH_TOKEN_TTL_SECS",
            &mut self.auth.refresh_token_ttl_secs,
        );
        Self::apply_env_parse(
            "AG_AUTH_EMAIL_VERIFICATION_TTL_SECS",
            &mut self.auth.email_verification_ttl_secs,
        );
        Self::apply_env_parse("AG_AUTH_REUSE_POLICY", &mut self.auth.reuse_policy);
        Self::apply_env_bool(
            "AG_AUTH_REQUIRE_VERIFIED_EMAIL",
            &mut self.auth.require_verified_email,
        );
        Self::apply_env_parse("AG_AUTH_BCRYPT_COST", &mut self.auth.bcrypt_cost);

        // Bruteforce
        Self::apply_env_parse(
            "AG_BRUTEFORCE_EMAIL_MAX_ATTEMPTS",
            &mut self.bruteforce.email.max_attempts,
        );
        Self::apply_env_parse(
            "AG_BRUTEFORCE_EMAIL_LOCKOUT_SECS",
            &mut self.bruteforce.email.lockout_secs,
        );
        Self::apply_env_parse(
            "AG_BRUTEFORCE_EMAIL_BACKOFF",
            &mut self.bruteforce.email.backoff,
        );
        Self::apply_env_parse(
            "AG_BRUTEFORCE_IP_MAX_ATTEMPTS",
            &mut self.bruteforce.ip.max_attempts,
        );
        Self::apply_env_parse(
            "AG_BRUTEFORCE_IP_LOCKOUT_SECS",
            &mut self.bruteforce.ip.lockout_secs,
        );
        Self::apply_env_parse("AG_BRUTEFORCE_IP_BACKOFF", &mut self.bruteforce.ip.backoff);

        // Request limit
        Self::apply_env_parse(
            "AG_REQUEST_LIMIT_MAX_REQUESTS",
            &mut self.request_limit.max_requests,
        );
        Self::apply_env_parse(
            "AG_REQUEST_LIMIT_WINDOW_SECS",
            &mut self.request_limit.window_secs,
        );

        // Logging
        Self::apply_env_parse("AG_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("AG_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("AG_LOG_FILE", &mut self.logging.file);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true"/"1"; anything else is false
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Unparseable values leave the target untouched
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name) {
            if let Ok(parsed) = val.parse() {
                *target = parsed;
            }
        }
    }

    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
