mod common;

use common::{ORIGIN, PASSWORD, client, harness, harness_with, register, test_settings, wait_for_events};

use ag_auth::{AuthError, Clock, RedeemError, SessionInvalidReason};
use ag_core::{RefreshTokenState, ReusePolicy, SecurityEventKind};
use ag_db::RefreshTokenRepository;

use chrono::Duration;
use googletest::prelude::*;

const EMAIL: &str = "alice@example.com";

#[tokio::test]
async fn given_active_secret_when_redeemed_repeatedly_then_one_link_per_call() {
    // Given
    let h = harness().await;
    register(&h, EMAIL).await;
    let login = h
        .services
        .sessions
        .login(EMAIL, PASSWORD, &client(ORIGIN))
        .await
        .unwrap();

    // When: three rotations in a row
    let mut secret = login.refresh_secret;
    for _ in 0..3 {
        let redeemed = h
            .services
            .store
            .redeem(secret.as_str(), client(ORIGIN))
            .await
            .unwrap();
        secret = redeemed.refresh_secret;
    }

    // Then: four links, only the last one active
    let chain = RefreshTokenRepository::new(h.pool.clone())
        .find_by_session(login.session_id)
        .await
        .unwrap();
    assert_that!(chain, len(eq(4)));
    let now = h.clock.now();
    let active: Vec<_> = chain.iter().filter(|r| r.is_active_at(now)).collect();
    assert_that!(active, len(eq(1)));
    assert_that!(active[0].token_hash, eq(&secret.digest()));
}

#[tokio::test]
async fn given_secret_redeemed_twice_then_second_is_reuse_and_whole_chain_unusable() {
    let h = harness().await;
    register(&h, EMAIL).await;
    let sessions = &h.services.sessions;
    let login = sessions.login(EMAIL, PASSWORD, &client(ORIGIN)).await.unwrap();

    let first = sessions
        .refresh(login.refresh_secret.as_str(), &client(ORIGIN))
        .await
        .unwrap();
    let replay = sessions
        .refresh(login.refresh_secret.as_str(), &client("198.51.100.66"))
        .await;

    assert!(matches!(
        replay,
        Err(AuthError::SessionInvalid {
            reason: SessionInvalidReason::ReuseDetected,
            ..
        })
    ));
    // The legitimately issued successor is revoked too
    let successor = sessions
        .refresh(first.refresh_secret.as_str(), &client(ORIGIN))
        .await;
    assert!(matches!(successor, Err(AuthError::SessionInvalid { .. })));

    let events = wait_for_events(&h.pool, SecurityEventKind::RefreshReuseDetected, 2).await;
    let chain_lengths: Vec<usize> = events
        .iter()
        .filter_map(|e| e.context["revoked_chain"].as_array().map(Vec::len))
        .collect();
    assert!(chain_lengths.contains(&2));
}

#[tokio::test]
async fn given_expired_secret_when_redeemed_then_expired_and_no_link_created() {
    let h = harness().await;
    register(&h, EMAIL).await;
    let login = h
        .services
        .sessions
        .login(EMAIL, PASSWORD, &client(ORIGIN))
        .await
        .unwrap();

    h.clock.advance(Duration::days(7) + Duration::seconds(1));
    let result = h
        .services
        .store
        .redeem(login.refresh_secret.as_str(), client(ORIGIN))
        .await;

    assert!(matches!(result, Err(RedeemError::Expired)));
    let chain = RefreshTokenRepository::new(h.pool.clone())
        .find_by_session(login.session_id)
        .await
        .unwrap();
    assert_that!(chain, len(eq(1)));
}

#[tokio::test]
async fn given_concurrent_redeems_of_one_secret_then_exactly_one_succeeds() {
    let h = harness().await;
    register(&h, EMAIL).await;
    let login = h
        .services
        .sessions
        .login(EMAIL, PASSWORD, &client(ORIGIN))
        .await
        .unwrap();
    let store = h.services.store.clone();
    let other = h.second_instance().store;

    let secret = login.refresh_secret.as_str().to_string();
    let (a, b) = tokio::join!(
        store.redeem(&secret, client(ORIGIN)),
        other.redeem(&secret, client(ORIGIN))
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_that!(successes, eq(1));
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(loser, Err(RedeemError::ReuseDetected { .. })));
}

#[tokio::test]
async fn given_all_sessions_policy_when_reuse_detected_then_other_sessions_revoked() {
    let mut settings = test_settings();
    settings.reuse_policy = ReusePolicy::AllSessions;
    let h = harness_with(settings).await;
    let identity = register(&h, EMAIL).await;
    let sessions = &h.services.sessions;
    let laptop = sessions.login(EMAIL, PASSWORD, &client(ORIGIN)).await.unwrap();
    let phone = sessions.login(EMAIL, PASSWORD, &client(ORIGIN)).await.unwrap();

    sessions
        .refresh(laptop.refresh_secret.as_str(), &client(ORIGIN))
        .await
        .unwrap();
    let _ = sessions
        .refresh(laptop.refresh_secret.as_str(), &client(ORIGIN))
        .await;

    let active = RefreshTokenRepository::new(h.pool.clone())
        .count_active_for_identity(identity.id, h.clock.now())
        .await
        .unwrap();
    assert_that!(active, eq(0));
    assert!(
        sessions
            .refresh(phone.refresh_secret.as_str(), &client(ORIGIN))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn given_chain_only_policy_when_reuse_detected_then_other_sessions_survive() {
    let h = harness().await;
    register(&h, EMAIL).await;
    let sessions = &h.services.sessions;
    let laptop = sessions.login(EMAIL, PASSWORD, &client(ORIGIN)).await.unwrap();
    let phone = sessions.login(EMAIL, PASSWORD, &client(ORIGIN)).await.unwrap();

    sessions
        .refresh(laptop.refresh_secret.as_str(), &client(ORIGIN))
        .await
        .unwrap();
    let _ = sessions
        .refresh(laptop.refresh_secret.as_str(), &client(ORIGIN))
        .await;

    assert!(
        sessions
            .refresh(phone.refresh_secret.as_str(), &client(ORIGIN))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn given_disabled_identity_when_redeemed_then_identity_inactive_and_token_revoked() {
    let h = harness().await;
    let identity = register(&h, EMAIL).await;
    let login = h
        .services
        .sessions
        .login(EMAIL, PASSWORD, &client(ORIGIN))
        .await
        .unwrap();
    // Flip the flag directly so the token survives until redemption
    ag_db::IdentityRepository::new(h.pool.clone())
        .set_active(identity.id, false)
        .await
        .unwrap();

    let result = h
        .services
        .store
        .redeem(login.refresh_secret.as_str(), client(ORIGIN))
        .await;

    assert!(matches!(result, Err(RedeemError::IdentityInactive)));
    let record = RefreshTokenRepository::new(h.pool.clone())
        .find_by_hash(&login.refresh_secret.digest())
        .await
        .unwrap()
        .unwrap();
    assert_that!(
        record.state_at(h.clock.now()),
        eq(RefreshTokenState::Revoked)
    );
}
