use ag_core::{ClientFingerprint, Identity, RefreshTokenRecord, Role};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

/// Fixed instant so expiry arithmetic in tests is exact
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub fn build_identity(email: &str) -> Identity {
    Identity::new(email.to_string(), "$2b$04$fixturehash".to_string(), Role::User, t0())
}

pub fn fingerprint() -> ClientFingerprint {
    ClientFingerprint::new("203.0.113.7", Some("test-agent/1.0".to_string()))
}

/// A record issued at `issued_at` living for seven days
pub fn build_refresh_record(
    identity_id: Uuid,
    session_id: Uuid,
    token_hash: &str,
    issued_at: DateTime<Utc>,
) -> RefreshTokenRecord {
    RefreshTokenRecord::new(
        identity_id,
        session_id,
        token_hash.to_string(),
        issued_at,
        issued_at + Duration::days(7),
        fingerprint(),
    )
}
