use crate::AppState;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /metrics - Prometheus text exposition
pub async fn prometheus(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
