//! Client identity resolution for rate limiting.
//!
//! Forwarding headers are trusted as-is: the service is expected to sit
//! behind a single reverse proxy that sets them. A client talking to the
//! service directly can spoof its identity with these headers.

use axum::http::HeaderMap;
use std::collections::HashMap;
use std::net::SocketAddr;

pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity used when nothing in the request identifies the client.
pub const FALLBACK_CLIENT_KEY: &str = "unknown";

/// The parts of an incoming request the limiter looks at.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub remote_addr: Option<String>,
}

impl RequestDescriptor {
    pub fn new(headers: HashMap<String, String>, remote_addr: Option<String>) -> Self {
        Self {
            headers,
            remote_addr,
        }
    }

    /// Build a descriptor from an HTTP header map and the peer address.
    ///
    /// Headers whose values are not visible ASCII are skipped. Repeated
    /// header lines are joined with `", "` in arrival order.
    pub fn from_http(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> Self {
        let mut joined: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let Ok(value) = value.to_str() else {
                continue;
            };
            joined
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        Self {
            headers: joined,
            remote_addr: remote_addr.map(|addr| addr.ip().to_string()),
        }
    }
}

/// Derives a client key from request headers and the connection address.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    fallback: String,
}

impl IdentityResolver {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    /// Resolve the client key. First match wins:
    /// `cf-connecting-ip`, `x-real-ip`, the first `x-forwarded-for` hop,
    /// the remote address, then the fallback key.
    pub fn resolve(&self, request: &RequestDescriptor) -> String {
        let headers = &request.headers;

        non_empty(headers.get(CF_CONNECTING_IP).map(String::as_str))
            .or_else(|| non_empty(headers.get(X_REAL_IP).map(String::as_str)))
            .or_else(|| {
                non_empty(
                    headers
                        .get(X_FORWARDED_FOR)
                        .and_then(|xff| xff.split(',').next())
                        .map(str::trim),
                )
            })
            .or_else(|| non_empty(request.remote_addr.as_deref()))
            .unwrap_or(self.fallback.as_str())
            .to_string()
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(FALLBACK_CLIENT_KEY)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
