use crate::ApiError;
use crate::api::error::{INTERNAL_ERROR_MESSAGE, SESSION_INVALID_MESSAGE};

use ag_auth::{AuthError, SessionInvalidReason};

use axum::response::IntoResponse;
use googletest::prelude::*;
use http::{StatusCode, header::RETRY_AFTER};
use http_body_util::BodyExt;

async fn render(error: ApiError) -> (StatusCode, http::HeaderMap, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_any_session_reason_when_rendered_then_same_401_body() {
    let mut bodies = Vec::new();
    for reason in [
        SessionInvalidReason::Expired,
        SessionInvalidReason::NotFound,
        SessionInvalidReason::ReuseDetected,
        SessionInvalidReason::Revoked,
        SessionInvalidReason::IdentityInactive,
    ] {
        let (status, _, json) = render(ApiError::from(AuthError::session_invalid(reason))).await;
        assert_that!(status, eq(StatusCode::UNAUTHORIZED));
        bodies.push(json);
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(bodies[0]["error"]["code"], "SESSION_INVALID");
    assert_eq!(bodies[0]["error"]["message"], SESSION_INVALID_MESSAGE);
}

#[tokio::test]
async fn given_invalid_credentials_when_rendered_then_generic_401() {
    let (status, _, json) = render(ApiError::from(AuthError::invalid_credentials())).await;

    assert_that!(status, eq(StatusCode::UNAUTHORIZED));
    assert_eq!(json["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn given_rate_limited_when_rendered_then_429_with_retry_after() {
    let error = AuthError::RateLimited {
        retry_after_secs: 42,
        location: error_location::ErrorLocation::from(std::panic::Location::caller()),
    };

    let (status, headers, json) = render(ApiError::from(error)).await;

    assert_that!(status, eq(StatusCode::TOO_MANY_REQUESTS));
    assert_that!(headers.get(RETRY_AFTER).unwrap().to_str().unwrap(), eq("42"));
    assert_eq!(json["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn given_validation_error_when_rendered_then_400_with_field() {
    let error = AuthError::validation("password must be at least 8 characters", Some("password"));

    let (status, _, json) = render(ApiError::from(error)).await;

    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["field"], "password");
    assert_eq!(json["error"]["message"], "password must be at least 8 characters");
}

#[tokio::test]
async fn given_internal_error_in_production_when_rendered_then_detail_hidden() {
    let error = AuthError::internal("disk on fire");

    let (status, _, json) = render(ApiError::from_auth(error, false)).await;

    assert_that!(status, eq(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(json["error"]["message"], INTERNAL_ERROR_MESSAGE);
}

#[tokio::test]
async fn given_internal_error_in_development_when_rendered_then_detail_shown() {
    let error = AuthError::internal("disk on fire");

    let (_, _, json) = render(ApiError::from_auth(error, true)).await;

    let message = json["error"]["message"].as_str().unwrap();
    assert_that!(message, contains_substring("disk on fire"));
}

#[tokio::test]
async fn given_forbidden_when_rendered_then_403_without_field() {
    let error = ag_auth::require_role(ag_core::Role::User, ag_core::Role::Admin).unwrap_err();

    let (status, _, json) = render(ApiError::from(error)).await;

    assert_that!(status, eq(StatusCode::FORBIDDEN));
    assert_eq!(json["error"]["code"], "FORBIDDEN");
    assert!(json["error"].get("field").is_none());
}
