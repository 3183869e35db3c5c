use crate::{AppState, ClientOrigin};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

/// Per-address request budget for the unauthenticated `/auth` routes.
/// Coarse flood control only; login lockouts live in the store.
pub async fn throttle(
    State(state): State<AppState>,
    origin: ClientOrigin,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = state.request_limiter.check(&origin.ip) {
        warn!("Request throttle hit for {} on {}", origin.ip, request.uri().path());
        return state.api_error(e).into_response();
    }

    next.run(request).await
}
