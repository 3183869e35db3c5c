#![allow(dead_code)]

use ag_auth::{
    AuthServices, AuthSettings, EmailSender, ManualClock, Result as AuthErrorResult,
};
use ag_core::{ClientFingerprint, Identity, SecurityEventKind, SecurityLogEntry};
use ag_db::{SecurityLogFilter, SecurityLogRepository};

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub const PASSWORD: &str = "correct horse battery";
pub const ORIGIN: &str = "203.0.113.7";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentEmail {
    Verification { to: String, token: String },
    PasswordReset { to: String, token: String },
}

/// Keeps every message instead of delivering it
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_reset_token(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|m| match m {
            SentEmail::PasswordReset { token, .. } => Some(token),
            _ => None,
        })
    }

    pub fn last_verification_token(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|m| match m {
            SentEmail::Verification { token, .. } => Some(token),
            _ => None,
        })
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_verification(&self, email: &str, token: &str) -> AuthErrorResult<()> {
        self.sent.lock().unwrap().push(SentEmail::Verification {
            to: email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> AuthErrorResult<()> {
        self.sent.lock().unwrap().push(SentEmail::PasswordReset {
            to: email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}

pub struct Harness {
    pub pool: SqlitePool,
    pub services: AuthServices,
    pub clock: Arc<ManualClock>,
    pub email: Arc<RecordingEmailSender>,
    pub settings: AuthSettings,
}

impl Harness {
    /// Another service graph over the same database, as a second process would have
    pub fn second_instance(&self) -> AuthServices {
        AuthServices::build(
            self.pool.clone(),
            &self.settings,
            self.clock.clone(),
            self.email.clone(),
        )
        .unwrap()
    }
}

pub fn test_settings() -> AuthSettings {
    let mut settings = AuthSettings::with_hs256_secret(b"integration-test-secret-32-bytes!".to_vec());
    settings.bcrypt_cost = 4;
    settings
}

pub async fn harness() -> Harness {
    harness_with(test_settings()).await
}

pub async fn harness_with(settings: AuthSettings) -> Harness {
    let pool = ag_db::connect_in_memory().await.unwrap();
    harness_over(pool, settings)
}

/// Harness over a multi-connection pool on a database file in `dir`
pub async fn harness_on_disk(dir: &Path) -> Harness {
    let pool = ag_db::connect(&dir.join("authgate.db")).await.unwrap();
    harness_over(pool, test_settings())
}

fn harness_over(pool: SqlitePool, settings: AuthSettings) -> Harness {
    // Starts at the real time because JWT expiry is checked against the system clock
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let email = Arc::new(RecordingEmailSender::default());
    let services =
        AuthServices::build(pool.clone(), &settings, clock.clone(), email.clone()).unwrap();

    Harness {
        pool,
        services,
        clock,
        email,
        settings,
    }
}

pub fn client(ip: &str) -> ClientFingerprint {
    ClientFingerprint::new(ip, Some("integration-test".to_string()))
}

pub async fn register(h: &Harness, email: &str) -> Identity {
    h.services
        .accounts
        .register(email, PASSWORD, ORIGIN)
        .await
        .unwrap()
}

/// Audit entries of `kind`, waiting for detached writes to land
pub async fn wait_for_events(pool: &SqlitePool, kind: SecurityEventKind, at_least: usize) -> Vec<SecurityLogEntry> {
    let repo = SecurityLogRepository::new(pool.clone());
    let filter = SecurityLogFilter {
        event: Some(kind),
        ..Default::default()
    };

    for _ in 0..100 {
        let (_, entries) = repo.list(&filter, 0, 1000).await.unwrap();
        if entries.len() >= at_least {
            return entries;
        }
        tokio::time::sleep(StdDuration::from_millis(20)).await;
    }

    let (_, entries) = repo.list(&filter, 0, 1000).await.unwrap();
    entries
}
