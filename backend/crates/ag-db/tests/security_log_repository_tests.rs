mod common;

use common::{create_test_identity, create_test_pool, t0};

use ag_core::{SecurityEventKind, SecurityLogEntry};
use ag_db::{SecurityLogFilter, SecurityLogRepository};

use chrono::Duration;
use googletest::prelude::*;
use serde_json::json;

#[tokio::test]
async fn given_appended_entry_when_listed_then_context_roundtrips() {
    // Given
    let pool = create_test_pool().await;
    let identity = create_test_identity(&pool, "alice@example.com").await;
    let repo = SecurityLogRepository::new(pool);
    let entry = SecurityLogEntry::new(SecurityEventKind::LoginSuccess, "203.0.113.7", t0())
        .with_actor(identity.id)
        .with_email("alice@example.com")
        .with_context(json!({ "session_id": "abc" }));
    repo.append(&entry).await.unwrap();

    // When
    let (total, entries) = repo
        .list(&SecurityLogFilter::default(), 0, 10)
        .await
        .unwrap();

    // Then
    assert_that!(total, eq(1));
    assert_that!(entries, len(eq(1)));
    assert_that!(entries[0].id, eq(entry.id));
    assert_that!(entries[0].actor_id, some(eq(identity.id)));
    assert_that!(entries[0].context["session_id"], eq(&json!("abc")));
}

#[tokio::test]
async fn given_mixed_events_when_filtering_by_event_and_time_then_only_matches_newest_first() {
    let pool = create_test_pool().await;
    let repo = SecurityLogRepository::new(pool);
    for minute in 0..4 {
        let event = if minute % 2 == 0 {
            SecurityEventKind::LoginFailure
        } else {
            SecurityEventKind::RateLimited
        };
        repo.append(&SecurityLogEntry::new(
            event,
            "10.0.0.1",
            t0() + Duration::minutes(minute),
        ))
        .await
        .unwrap();
    }

    let filter = SecurityLogFilter {
        event: Some(SecurityEventKind::LoginFailure),
        from: Some(t0()),
        to: Some(t0() + Duration::minutes(3)),
        ..Default::default()
    };
    let (total, entries) = repo.list(&filter, 0, 10).await.unwrap();

    assert_that!(total, eq(2));
    assert_that!(entries[0].timestamp, eq(t0() + Duration::minutes(2)));
    assert_that!(entries[1].timestamp, eq(t0()));
}

#[tokio::test]
async fn given_many_entries_when_paging_then_total_counts_all() {
    let pool = create_test_pool().await;
    let repo = SecurityLogRepository::new(pool);
    for minute in 0..5 {
        repo.append(&SecurityLogEntry::new(
            SecurityEventKind::Logout,
            "10.0.0.1",
            t0() + Duration::minutes(minute),
        ))
        .await
        .unwrap();
    }

    let (total, page) = repo
        .list(&SecurityLogFilter::default(), 3, 2)
        .await
        .unwrap();

    assert_that!(total, eq(5));
    assert_that!(page, len(eq(2)));
}

#[tokio::test]
async fn given_entry_when_updating_row_directly_then_store_rejects() {
    let pool = create_test_pool().await;
    let repo = SecurityLogRepository::new(pool.clone());
    repo.append(&SecurityLogEntry::new(SecurityEventKind::Logout, "10.0.0.1", t0()))
        .await
        .unwrap();

    let update = sqlx::query("UPDATE security_logs SET origin = 'x'")
        .execute(&pool)
        .await;
    let delete = sqlx::query("DELETE FROM security_logs").execute(&pool).await;

    assert!(update.is_err());
    assert!(delete.is_err());
}
