use crate::{Backoff, CoreError, ReusePolicy};

use std::str::FromStr;

#[test]
fn test_reuse_policy_roundtrips_through_str() {
    for policy in [ReusePolicy::ChainOnly, ReusePolicy::AllSessions] {
        assert_eq!(ReusePolicy::from_str(policy.as_str()).unwrap(), policy);
    }
    assert_eq!(ReusePolicy::default(), ReusePolicy::ChainOnly);
}

#[test]
fn test_backoff_rejects_unknown_value() {
    let result = Backoff::from_str("linear");

    assert!(matches!(
        result,
        Err(CoreError::InvalidPolicy { name: "backoff", .. })
    ));
}

#[test]
fn test_policies_deserialize_from_snake_case() {
    let backoff: Backoff = serde_json::from_str("\"exponential\"").unwrap();
    let policy: ReusePolicy = serde_json::from_str("\"all_sessions\"").unwrap();

    assert_eq!(backoff, Backoff::Exponential);
    assert_eq!(policy, ReusePolicy::AllSessions);
}
