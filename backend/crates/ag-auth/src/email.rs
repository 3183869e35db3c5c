use crate::Result as AuthErrorResult;

use async_trait::async_trait;
use log::info;

/// Outbound email collaborator. Delivery transport is out of scope; the
/// service only decides when a message is due and what token it carries.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_verification(&self, email: &str, token: &str) -> AuthErrorResult<()>;

    async fn send_password_reset(&self, email: &str, token: &str) -> AuthErrorResult<()>;
}

/// Logs that a message would be sent. The token itself is never logged.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_verification(&self, email: &str, _token: &str) -> AuthErrorResult<()> {
        info!("Verification email queued for {}", email);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, _token: &str) -> AuthErrorResult<()> {
        info!("Password reset email queued for {}", email);
        Ok(())
    }
}
