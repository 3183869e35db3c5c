#![allow(dead_code)]

//! Router-level test harness over an in-memory database

use ag_auth::{
    AuthServices, AuthSettings, EmailSender, RequestLimitConfig, RequestLimiter,
    Result as AuthErrorResult, SystemClock,
};
use ag_config::Environment;
use ag_server::{AppState, build_router};

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";
pub const CLIENT_IP: &str = "203.0.113.10";

#[derive(Default)]
pub struct RecordingEmailSender {
    resets: Mutex<Vec<String>>,
    verifications: Mutex<Vec<String>>,
}

impl RecordingEmailSender {
    pub fn last_reset_token(&self) -> Option<String> {
        self.resets.lock().unwrap().last().cloned()
    }

    pub fn last_verification_token(&self) -> Option<String> {
        self.verifications.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_verification(&self, _email: &str, token: &str) -> AuthErrorResult<()> {
        self.verifications.lock().unwrap().push(token.to_string());
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str, token: &str) -> AuthErrorResult<()> {
        self.resets.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub email: Arc<RecordingEmailSender>,
}

pub fn test_settings() -> AuthSettings {
    let mut settings = AuthSettings::with_hs256_secret(b"router-test-secret-of-32-bytes!!".to_vec());
    settings.bcrypt_cost = 4;
    settings
}

pub async fn test_app() -> TestApp {
    test_app_with(test_settings(), RequestLimitConfig {
        max_requests: 1000,
        window_secs: 60,
    })
    .await
}

pub async fn test_app_with(settings: AuthSettings, limit: RequestLimitConfig) -> TestApp {
    let pool = ag_db::connect_in_memory().await.unwrap();
    let email = Arc::new(RecordingEmailSender::default());
    let services =
        AuthServices::build(pool.clone(), &settings, Arc::new(SystemClock), email.clone()).unwrap();

    let state = AppState {
        pool,
        services,
        request_limiter: Arc::new(RequestLimiter::new(limit)),
        environment: Environment::Production,
        trust_proxy_headers: true,
        metrics: None,
    };

    TestApp {
        router: build_router(state.clone()),
        state,
        email,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    json_request_from(method, uri, body, CLIENT_IP)
}

/// JSON request as if sent by `ip` through a trusted proxy
pub fn json_request_from(method: &str, uri: &str, body: Value, ip: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn bearer_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header("x-forwarded-for", CLIENT_IP);

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn register(app: &TestApp, email: &str) -> Value {
    let (status, json) = send(
        app,
        json_request("POST", "/auth/register", json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {json}");
    json
}

/// Returns (access_token, refresh_token)
pub async fn login(app: &TestApp, email: &str) -> (String, String) {
    let (status, json) = send(
        app,
        json_request("POST", "/auth/login", json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {email}: {json}");
    (
        json["access_token"].as_str().unwrap().to_string(),
        json["refresh_token"].as_str().unwrap().to_string(),
    )
}
