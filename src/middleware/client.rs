use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};

use crate::state::AppState;

/// Address the request came from. This keys the login throttle and the
/// rate limiter, so it must not be chosen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

/// The socket peer, or the first `X-Forwarded-For` hop when `trust_proxy`
/// is set (only behind a proxy that overwrites the header).
pub fn client_addr(headers: &HeaderMap, extensions: &Extensions, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(addr) = forwarded {
            return addr.to_string();
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(ClientAddr(client_addr(
            &parts.headers,
            &parts.extensions,
            state.config.server.trust_proxy,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5000))));
        extensions
    }

    fn forwarded() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers
    }

    #[test]
    fn forwarded_header_ignored_by_default() {
        assert_eq!(client_addr(&HeaderMap::new(), &peer(), false), "10.0.0.1");
        assert_eq!(client_addr(&forwarded(), &peer(), false), "10.0.0.1");
    }

    #[test]
    fn trusted_proxy_header_wins_over_socket() {
        assert_eq!(client_addr(&forwarded(), &peer(), true), "203.0.113.9");
        assert_eq!(client_addr(&HeaderMap::new(), &peer(), true), "10.0.0.1");
    }

    #[test]
    fn unknown_without_any_source() {
        assert_eq!(client_addr(&HeaderMap::new(), &Extensions::new(), true), "unknown");
    }
}
