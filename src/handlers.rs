use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::health::HealthChecker;
use crate::identity::IdentityResolver;
use crate::metrics::{MetricsCollector, ThrottleMetrics};
use crate::rate_limiter::{LimiterStats, RateLimiter};

/// Application state shared by handlers, middleware and the cleanup task
#[derive(Clone)]
pub struct AppState {
    pub rate_limiter: Arc<RateLimiter>,
    pub resolver: Arc<IdentityResolver>,
    pub metrics: MetricsCollector,
    pub health: Arc<HealthChecker>,
}

impl AppState {
    pub fn new(rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            rate_limiter,
            resolver: Arc::new(IdentityResolver::default()),
            metrics: MetricsCollector::new(),
            health: Arc::new(HealthChecker::new()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LimiterReport {
    #[serde(flatten)]
    pub stats: LimiterStats,
    pub metrics: ThrottleMetrics,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub limiters: Vec<LimiterReport>,
}

#[derive(Debug, Serialize)]
pub struct OrderAccepted {
    pub status: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.health.check_health(&state.rate_limiter))
}

/// Per-limiter policy, tracked identities and decision totals
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let limiters = state
        .rate_limiter
        .stats()
        .into_iter()
        .map(|stats| LimiterReport {
            metrics: state.metrics.get(stats.limiter),
            stats,
        })
        .collect();

    Json(StatsResponse { limiters })
}

/// Order creation endpoint.
///
/// Reaching this handler means both limiters accepted the request; the
/// order itself is handled by the host application.
pub async fn create_order() -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(OrderAccepted {
            status: "accepted".to_string(),
        }),
    )
}
