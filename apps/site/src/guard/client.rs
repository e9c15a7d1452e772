//! Caller identity for anonymous endpoints.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::request::Parts,
};
use sha2::{Digest, Sha256};

const HASH_PREFIX_LEN: usize = 16;

/// Whether a reverse proxy in front of the service sets forwarding headers.
/// When false, those headers are client-controlled and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrustProxy(pub bool);

/// Client address used for rate-limit keys.
///
/// Behind a trusted proxy: the last `X-Forwarded-For` hop (the one the proxy
/// appended), then `X-Real-IP`, then the socket peer. Otherwise only the
/// socket peer. Falls back to `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    TrustProxy: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TrustProxy(trusted) = TrustProxy::from_ref(state);

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        if !trusted {
            return Ok(ClientIp(peer.unwrap_or_else(|| "unknown".to_string())));
        }

        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let forwarded = header("x-forwarded-for")
            .and_then(|v| v.rsplit(',').next().map(|s| s.trim().to_string()))
            .filter(|v| !v.is_empty());

        let ip = forwarded
            .or_else(|| header("x-real-ip"))
            .or(peer)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientIp(ip))
    }
}

/// Salted SHA-256 of the address, truncated. Safe to store and log.
pub fn hash_ip(ip: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(ip.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(HASH_PREFIX_LEN);
    digest
}

/// Rate-limit key of the form `<prefix>:<hashed ip>`.
pub fn client_key(prefix: &str, ip: &str, salt: &str) -> String {
    format!("{prefix}:{}", hash_ip(ip, salt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(builder: axum::http::request::Builder, trust: bool) -> ClientIp {
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        ClientIp::from_request_parts(&mut parts, &TrustProxy(trust))
            .await
            .unwrap()
    }

    fn peer() -> ConnectInfo<SocketAddr> {
        ConnectInfo(SocketAddr::from(([192, 0, 2, 10], 40000)))
    }

    #[tokio::test]
    async fn test_trusted_proxy_uses_hop_it_appended() {
        let ip = extract(
            Request::builder().header("x-forwarded-for", "1.2.3.4, 203.0.113.7"),
            true,
        )
        .await;
        assert_eq!(ip, ClientIp("203.0.113.7".into()));
    }

    #[tokio::test]
    async fn test_trusted_proxy_falls_back_to_real_ip() {
        let ip = extract(Request::builder().header("x-real-ip", "198.51.100.2"), true).await;
        assert_eq!(ip, ClientIp("198.51.100.2".into()));
    }

    #[tokio::test]
    async fn test_untrusted_forwarding_headers_are_ignored() {
        let builder = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-real-ip", "198.51.100.2")
            .extension(peer());
        assert_eq!(extract(builder, false).await, ClientIp("192.0.2.10".into()));

        let spoofed = Request::builder().header("x-forwarded-for", "203.0.113.99");
        assert_eq!(extract(spoofed, false).await, ClientIp("unknown".into()));
    }

    #[tokio::test]
    async fn test_unknown_without_any_source() {
        assert_eq!(extract(Request::builder(), true).await, ClientIp("unknown".into()));
    }

    #[test]
    fn test_client_key_is_stable_and_salted() {
        let a = client_key("waitlist", "203.0.113.7", "salt");
        assert_eq!(a, client_key("waitlist", "203.0.113.7", "salt"));
        assert_ne!(a, client_key("waitlist", "203.0.113.7", "pepper"));
        assert!(a.starts_with("waitlist:"));
        assert_eq!(a.len(), "waitlist:".len() + 16);
        assert!(!a.contains("203.0.113.7"));
    }
}
