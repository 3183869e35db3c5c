use crate::ApiError;

use ag_auth::{AuthError, AuthServices, RequestLimiter};
use ag_config::Environment;

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub services: AuthServices,
    pub request_limiter: Arc<RequestLimiter>,
    pub environment: Environment,
    /// Read the client address from `X-Forwarded-For`
    pub trust_proxy_headers: bool,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Translate a service error for the client. Internal detail is only
    /// included in development.
    #[track_caller]
    pub fn api_error(&self, error: AuthError) -> ApiError {
        ApiError::from_auth(error, self.environment.is_development())
    }
}
