//! HTTP flows under /admin
mod common;

use crate::common::{
    PASSWORD, TestApp, bearer_request, json_request, login, register, send, test_app,
};

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};

/// Registers superadmin, admin and user in that order and logs each in.
/// Returns their access tokens and ids.
async fn seeded(app: &TestApp) -> [(String, String); 3] {
    let mut out = Vec::new();
    for email in ["root@example.com", "admin@example.com", "user@example.com"] {
        let identity = register(app, email).await;
        let (access, _) = login(app, email).await;
        out.push((access, identity["id"].as_str().unwrap().to_string()));
    }
    [out.remove(0), out.remove(0), out.remove(0)]
}

async fn wait_for_logs(app: &TestApp, token: &str, uri: &str, at_least: u64) -> Value {
    for _ in 0..50 {
        let (status, json) = send(app, bearer_request("GET", uri, token, None)).await;
        assert_eq!(status, StatusCode::OK);
        if json["total"].as_u64().unwrap_or(0) >= at_least {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("fewer than {at_least} entries at {uri}");
}

#[tokio::test]
async fn given_plain_user_when_listing_identities_then_403() {
    let app = test_app().await;
    let [_, _, (user_token, _)] = seeded(&app).await;

    let (status, json) = send(&app, bearer_request("GET", "/admin/users", &user_token, None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn given_admin_when_listing_identities_then_paged() {
    let app = test_app().await;
    let [_, (admin_token, _), _] = seeded(&app).await;

    let (status, json) = send(
        &app,
        bearer_request("GET", "/admin/users?page=2&limit=2", &admin_token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert_eq!(json["page"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn given_oversized_limit_when_listing_identities_then_400() {
    let app = test_app().await;
    let [(root_token, _), _, _] = seeded(&app).await;

    let (status, json) = send(
        &app,
        bearer_request("GET", "/admin/users?limit=500", &root_token, None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn given_unknown_id_when_fetching_identity_then_404() {
    let app = test_app().await;
    let [(root_token, _), _, _] = seeded(&app).await;

    let (status, _) = send(
        &app,
        bearer_request(
            "GET",
            "/admin/users/00000000-0000-0000-0000-000000000000",
            &root_token,
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_superadmin_when_changing_role_then_applied_immediately() {
    // Given
    let app = test_app().await;
    let [(root_token, _), _, (user_token, user_id)] = seeded(&app).await;

    // When
    let (status, json) = send(
        &app,
        bearer_request(
            "PATCH",
            &format!("/admin/users/{user_id}/role"),
            &root_token,
            Some(json!({ "role": "admin" })),
        ),
    )
    .await;

    // Then: the existing access token carries the new role on the next call
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "admin");
    let (listing, _) = send(&app, bearer_request("GET", "/admin/users", &user_token, None)).await;
    assert_eq!(listing, StatusCode::OK);
}

#[tokio::test]
async fn given_admin_when_changing_role_then_403() {
    let app = test_app().await;
    let [_, (admin_token, _), (_, user_id)] = seeded(&app).await;

    let (status, _) = send(
        &app,
        bearer_request(
            "PATCH",
            &format!("/admin/users/{user_id}/role"),
            &admin_token,
            Some(json!({ "role": "admin" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn given_unknown_role_when_changing_role_then_400() {
    let app = test_app().await;
    let [(root_token, _), _, (_, user_id)] = seeded(&app).await;

    let (status, _) = send(
        &app,
        bearer_request(
            "PATCH",
            &format!("/admin/users/{user_id}/role"),
            &root_token,
            Some(json!({ "role": "emperor" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_disabled_identity_when_using_tokens_then_all_refused() {
    // Given
    let app = test_app().await;
    let [_, (admin_token, _), (user_token, user_id)] = seeded(&app).await;
    let (_, user_refresh) = login(&app, "user@example.com").await;

    // When
    let (status, json) = send(
        &app,
        bearer_request(
            "PATCH",
            &format!("/admin/users/{user_id}/disable"),
            &admin_token,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_active"], false);

    // Then
    let (me, _) = send(&app, bearer_request("GET", "/auth/me", &user_token, None)).await;
    assert_eq!(me, StatusCode::UNAUTHORIZED);
    let (refresh, _) = send(
        &app,
        json_request("POST", "/auth/refresh", json!({ "refresh_token": user_refresh })),
    )
    .await;
    assert_eq!(refresh, StatusCode::UNAUTHORIZED);
    let (login_status, json) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": "user@example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(login_status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "ACCOUNT_DISABLED");
}

#[tokio::test]
async fn given_disabled_identity_when_enabled_then_login_works_again() {
    let app = test_app().await;
    let [_, (admin_token, _), (_, user_id)] = seeded(&app).await;
    for action in ["disable", "enable"] {
        let (status, _) = send(
            &app,
            bearer_request(
                "PATCH",
                &format!("/admin/users/{user_id}/{action}"),
                &admin_token,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    login(&app, "user@example.com").await;
}

#[tokio::test]
async fn given_admin_when_disabling_superadmin_then_403() {
    let app = test_app().await;
    let [(_, root_id), (admin_token, _), _] = seeded(&app).await;

    let (status, _) = send(
        &app,
        bearer_request(
            "PATCH",
            &format!("/admin/users/{root_id}/disable"),
            &admin_token,
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn given_failed_logins_when_filtering_security_logs_then_only_that_event() {
    // Given
    let app = test_app().await;
    let [(root_token, _), _, _] = seeded(&app).await;
    for _ in 0..2 {
        send(
            &app,
            json_request(
                "POST",
                "/auth/login",
                json!({ "email": "user@example.com", "password": "not the password" }),
            ),
        )
        .await;
    }

    // When
    let json = wait_for_logs(
        &app,
        &root_token,
        "/admin/security-logs?event=login_failure&email=USER@example.com",
        2,
    )
    .await;

    // Then
    let items = json["items"].as_array().unwrap();
    assert_eq!(json["total"], 2);
    assert!(items.iter().all(|item| item["event"] == "login_failure"));
    assert!(items.iter().all(|item| item["email"] == "user@example.com"));
}

#[tokio::test]
async fn given_inverted_range_when_filtering_security_logs_then_400() {
    let app = test_app().await;
    let [(root_token, _), _, _] = seeded(&app).await;

    let (status, _) = send(
        &app,
        bearer_request(
            "GET",
            "/admin/security-logs?from=2026-02-01T00:00:00Z&to=2026-01-01T00:00:00Z",
            &root_token,
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
