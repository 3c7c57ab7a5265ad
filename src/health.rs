use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::rate_limiter::RateLimiter;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub tracked_identities: usize,
}

pub struct HealthChecker {
    started: Instant,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// The limiter has no external dependencies, so the service is healthy
    /// whenever it can answer.
    pub fn check_health(&self, limiter: &RateLimiter) -> HealthStatus {
        let tracked_identities = limiter.stats().iter().map(|s| s.tracked_keys).sum();

        HealthStatus {
            status: "healthy".to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
            tracked_identities,
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
