pub mod attempt_counter;
pub mod attempt_kind;
pub mod backoff;
pub mod client_fingerprint;
pub mod identity;
pub mod password_reset_token;
pub mod refresh_token;
pub mod reuse_policy;
pub mod role;
pub mod security_event_kind;
pub mod security_log_entry;
