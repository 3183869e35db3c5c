pub mod connection;
pub mod error;
pub mod repositories;

mod time;

pub use connection::{connect, connect_in_memory, run_migrations};
pub use error::{DbError, Result};
pub use repositories::attempt_counter_repository::AttemptCounterRepository;
pub use repositories::identity_repository::IdentityRepository;
pub use repositories::password_reset_repository::PasswordResetRepository;
pub use repositories::refresh_token_repository::{RefreshTokenRepository, RotateOutcome};
pub use repositories::security_log_repository::{SecurityLogFilter, SecurityLogRepository};
