pub mod admin;
pub mod auth;
pub mod error;
pub mod extractors;
pub mod throttle;

use crate::{ApiError, ApiResult};

use std::future::Future;

/// Run a flow on its own task so a dropped connection cannot cancel it
/// between writes.
pub(crate) async fn run_detached<F, T>(flow: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(flow)
        .await
        .map_err(|e| ApiError::internal(format!("Request task failed: {e}")))?
}
