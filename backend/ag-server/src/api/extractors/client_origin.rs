use crate::{ApiError, AppState};

use ag_core::ClientFingerprint;

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, header::USER_AGENT, request::Parts},
};

pub const UNKNOWN_ORIGIN: &str = "unknown";
const MAX_USER_AGENT_LENGTH: usize = 512;

/// Client address and user agent of the request.
///
/// The address comes from the first `X-Forwarded-For` hop when proxy
/// headers are trusted, otherwise from the socket peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin {
    pub ip: String,
    pub user_agent: Option<String>,
}

impl ClientOrigin {
    pub fn fingerprint(&self) -> ClientFingerprint {
        ClientFingerprint::new(self.ip.clone(), self.user_agent.clone())
    }

    pub fn from_parts(parts: &Parts, trust_proxy_headers: bool) -> Self {
        let forwarded = trust_proxy_headers
            .then(|| forwarded_for(&parts.headers))
            .flatten();

        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string());

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect());

        Self { ip, user_agent }
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(String::from)
}

impl FromRequestParts<AppState> for ClientOrigin {
    type Rejection = ApiError;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let origin = Self::from_parts(parts, state.trust_proxy_headers);
        async move { Ok(origin) }
    }
}
