use crate::{ClientFingerprint, RefreshTokenRecord, RefreshTokenState};

use chrono::{Duration, Utc};
use uuid::Uuid;

fn record() -> RefreshTokenRecord {
    let now = Utc::now();
    RefreshTokenRecord {
        id: Uuid::new_v4(),
        identity_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        token_hash: "hash".to_string(),
        issued_at: now,
        expires_at: now + Duration::days(7),
        revoked: false,
        revoked_at: None,
        replaced_by: None,
        fingerprint: ClientFingerprint::new("127.0.0.1", None),
    }
}

#[test]
fn given_fresh_record_when_state_then_active() {
    let record = record();

    assert_eq!(record.state_at(Utc::now()), RefreshTokenState::Active);
    assert!(record.is_active_at(Utc::now()));
}

#[test]
fn given_replaced_record_when_state_then_rotated() {
    let mut record = record();
    record.replaced_by = Some(Uuid::new_v4());

    assert_eq!(record.state_at(Utc::now()), RefreshTokenState::Rotated);
}

#[test]
fn given_revoked_and_expired_record_when_state_then_expired_wins() {
    let mut record = record();
    record.revoked = true;
    let later = record.expires_at + Duration::days(1);

    assert_eq!(record.state_at(later), RefreshTokenState::Expired);
}

#[test]
fn given_revoked_record_within_lifetime_when_state_then_revoked() {
    let mut record = record();
    record.revoked = true;
    record.replaced_by = Some(Uuid::new_v4());

    assert_eq!(record.state_at(Utc::now()), RefreshTokenState::Revoked);
}

#[test]
fn given_record_at_expiry_instant_when_state_then_expired() {
    let record = record();

    assert_eq!(record.state_at(record.expires_at), RefreshTokenState::Expired);
}
