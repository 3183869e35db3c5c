mod common;

use common::{build_identity, create_test_identity, create_test_pool};

use ag_core::Role;
use ag_db::{DbError, IdentityRepository};

use googletest::prelude::*;
use uuid::Uuid;

#[tokio::test]
async fn given_created_identity_when_found_by_email_with_other_case_then_returned() {
    // Given
    let pool = create_test_pool().await;
    let created = create_test_identity(&pool, "alice@example.com").await;
    let repo = IdentityRepository::new(pool);

    // When
    let found = repo.find_by_email("ALICE@Example.COM").await.unwrap();

    // Then
    let found = found.expect("identity should exist");
    assert_that!(found.id, eq(created.id));
    assert_that!(found.email, eq("alice@example.com"));
    assert_that!(found.role, eq(Role::User));
    assert_that!(found.is_active, eq(true));
    assert_that!(found.is_verified, eq(false));
}

#[tokio::test]
async fn given_existing_email_when_creating_again_then_duplicate_error() {
    let pool = create_test_pool().await;
    create_test_identity(&pool, "bob@example.com").await;
    let repo = IdentityRepository::new(pool);

    let result = repo.create(&build_identity("BOB@example.com")).await;

    assert!(matches!(result, Err(DbError::Duplicate { .. })));
}

#[tokio::test]
async fn given_empty_store_when_registering_three_identities_then_roles_follow_bootstrap_order() {
    let pool = create_test_pool().await;
    let repo = IdentityRepository::new(pool);

    let first = repo
        .create_with_bootstrap_role(&build_identity("first@example.com"))
        .await
        .unwrap();
    let second = repo
        .create_with_bootstrap_role(&build_identity("second@example.com"))
        .await
        .unwrap();
    let third = repo
        .create_with_bootstrap_role(&build_identity("third@example.com"))
        .await
        .unwrap();

    assert_that!(first.role, eq(Role::Superadmin));
    assert_that!(second.role, eq(Role::Admin));
    assert_that!(third.role, eq(Role::User));
    assert_that!(repo.count().await.unwrap(), eq(3));
}

#[tokio::test]
async fn given_identity_when_toggling_active_and_role_then_changes_persist() {
    let pool = create_test_pool().await;
    let identity = create_test_identity(&pool, "carol@example.com").await;
    let repo = IdentityRepository::new(pool);

    assert!(repo.set_active(identity.id, false).await.unwrap());
    assert!(repo.set_role(identity.id, Role::Admin).await.unwrap());

    let found = repo.find_by_id(identity.id).await.unwrap().unwrap();
    assert_that!(found.is_active, eq(false));
    assert_that!(found.role, eq(Role::Admin));
}

#[tokio::test]
async fn given_unknown_id_when_updating_then_reports_no_change() {
    let pool = create_test_pool().await;
    let repo = IdentityRepository::new(pool);

    let changed = repo.update_password(Uuid::new_v4(), "hash").await.unwrap();

    assert_that!(changed, eq(false));
}

#[tokio::test]
async fn given_unverified_identity_when_marked_twice_then_second_is_noop() {
    let pool = create_test_pool().await;
    let identity = create_test_identity(&pool, "dave@example.com").await;
    let repo = IdentityRepository::new(pool);

    assert!(repo.mark_verified(identity.id).await.unwrap());
    assert!(!repo.mark_verified(identity.id).await.unwrap());

    let found = repo.find_by_id(identity.id).await.unwrap().unwrap();
    assert_that!(found.is_verified, eq(true));
}

#[tokio::test]
async fn given_several_identities_when_listing_with_page_then_slice_returned() {
    let pool = create_test_pool().await;
    for i in 0..5 {
        create_test_identity(&pool, &format!("user{i}@example.com")).await;
    }
    let repo = IdentityRepository::new(pool);

    let page = repo.list(2, 2).await.unwrap();

    assert_that!(page, len(eq(2)));
    assert_that!(page[0].email, eq("user2@example.com"));
    assert_that!(page[1].email, eq("user3@example.com"));
}
