use crate::SecurityEventKind;

use std::str::FromStr;

#[test]
fn test_event_kind_round_trips_through_str() {
    let kinds = [
        SecurityEventKind::LoginSuccess,
        SecurityEventKind::RefreshReuseDetected,
        SecurityEventKind::RateLimited,
        SecurityEventKind::PasswordResetCompleted,
    ];

    for kind in kinds {
        assert_eq!(SecurityEventKind::from_str(kind.as_str()).unwrap(), kind);
    }
}

#[test]
fn test_event_kind_rejects_unknown() {
    assert!(SecurityEventKind::from_str("login_succeeded").is_err());
}
