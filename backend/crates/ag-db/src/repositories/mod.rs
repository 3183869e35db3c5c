pub mod attempt_counter_repository;
pub mod identity_repository;
pub mod password_reset_repository;
pub mod refresh_token_repository;
pub mod security_log_repository;
