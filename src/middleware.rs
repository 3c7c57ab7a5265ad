use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

use crate::algorithms::Decision;
use crate::handlers::AppState;
use crate::identity::RequestDescriptor;
use crate::rate_limiter::LimiterKind;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Logging middleware for request/response tracking
pub async fn logging_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_key = client_key(&state, &request);

    info!(
        target: "shop_throttler::middleware",
        method = %method,
        uri = %uri,
        client_key = %client_key,
        "Incoming request"
    );

    let response = next.run(request).await;

    let status = response.status();
    info!(
        target: "shop_throttler::middleware",
        method = %method,
        uri = %uri,
        status = %status,
        "Request completed"
    );

    response
}

/// Applies the general request limiter. Layered over every route.
pub async fn request_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(LimiterKind::Requests, state, request, next).await
}

/// Applies the order limiter. Layered over the order-creation route only.
pub async fn order_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(LimiterKind::Orders, state, request, next).await
}

async fn enforce(kind: LimiterKind, state: AppState, request: Request, next: Next) -> Response {
    let client_key = client_key(&state, &request);
    let decision = state.rate_limiter.check(kind, &client_key);
    state.metrics.record(kind, decision.is_allowed());

    match decision {
        Decision::Allowed { count } => {
            debug!(
                target: "shop_throttler::middleware",
                limiter = kind.as_str(),
                client_key = %client_key,
                count,
                "Event allowed"
            );

            let max_events = state.rate_limiter.policy(kind).max_events() as usize;
            let mut response = next.run(request).await;

            // An inner limiter has already set these; keep the more specific values.
            let headers = response.headers_mut();
            headers
                .entry(X_RATELIMIT_LIMIT)
                .or_insert_with(|| HeaderValue::from(max_events));
            headers
                .entry(X_RATELIMIT_REMAINING)
                .or_insert_with(|| HeaderValue::from(max_events.saturating_sub(count)));

            response
        }
        Decision::Denied(rejection) => {
            warn!(
                target: "shop_throttler::middleware",
                limiter = kind.as_str(),
                client_key = %client_key,
                retry_after_seconds = rejection.retry_after_seconds,
                "Rate limit exceeded"
            );

            rejection.into_response()
        }
    }
}

fn client_key(state: &AppState, request: &Request) -> String {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    state
        .resolver
        .resolve(&RequestDescriptor::from_http(request.headers(), remote_addr))
}
