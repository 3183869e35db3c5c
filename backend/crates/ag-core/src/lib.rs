pub mod error;
pub mod models;
pub mod validation;

pub use error::{CoreError, Result};
pub use models::attempt_counter::AttemptCounter;
pub use models::attempt_kind::AttemptKind;
pub use models::backoff::Backoff;
pub use models::client_fingerprint::ClientFingerprint;
pub use models::identity::Identity;
pub use models::password_reset_token::PasswordResetToken;
pub use models::refresh_token::{RefreshTokenRecord, RefreshTokenState};
pub use models::reuse_policy::ReusePolicy;
pub use models::role::Role;
pub use models::security_event_kind::SecurityEventKind;
pub use models::security_log_entry::SecurityLogEntry;

#[cfg(test)]
mod tests;
