use crate::api::throttle::throttle;
use crate::{
    AppState, disable_identity, enable_identity, get_identity, health, list_identities,
    list_security_logs, login, logout, me, metrics, refresh, register, request_password_reset,
    reset_password, send_verification_email, set_role, verify_email,
};

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Unauthenticated entry points share the per-address throttle
    let public_auth = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/request-password-reset", post(request_password_reset))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/send-verification-email", post(send_verification_email))
        .route("/auth/verify-email", get(verify_email))
        .route_layer(middleware::from_fn_with_state(state.clone(), throttle));

    Router::new()
        .merge(public_auth)
        .route("/auth/me", get(me))
        // Administration
        .route("/admin/users", get(list_identities))
        .route("/admin/users/{id}", get(get_identity))
        .route("/admin/users/{id}/role", patch(set_role))
        .route("/admin/users/{id}/disable", patch(disable_identity))
        .route("/admin/users/{id}/enable", patch(enable_identity))
        .route("/admin/security-logs", get(list_security_logs))
        // Probes
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/metrics", get(metrics::prometheus))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
