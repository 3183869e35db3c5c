mod auth_config;
mod bruteforce_config;
mod config;
mod database_config;
mod environment;
mod error;
mod log_level;
mod logging_config;
mod request_limit_config;
mod server_config;

pub use auth_config::AuthConfig;
pub use bruteforce_config::{AttemptPolicyConfig, BruteforceConfig};
pub use config::Config;
pub use database_config::DatabaseConfig;
pub use environment::Environment;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use request_limit_config::RequestLimitConfig;
pub use server_config::ServerConfig;

pub const CONFIG_DIR_ENV: &str = "AG_CONFIG_DIR";
pub const DEFAULT_CONFIG_DIR: &str = ".authgate";
pub const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const MIN_PORT: u16 = 1024;

const DEFAULT_DATABASE_FILENAME: &str = "authgate.db";

const DEFAULT_ISSUER: &str = "authgate";
const MIN_JWT_SECRET_LENGTH: usize = 32;
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_EMAIL_VERIFICATION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_BCRYPT_COST: u32 = 12;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

#[cfg(test)]
mod tests;
