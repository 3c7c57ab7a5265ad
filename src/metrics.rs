use crate::rate_limiter::LimiterKind;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleMetrics {
    pub total_requests: u64,
    pub allowed_requests: u64,
    pub throttled_requests: u64,
}

#[derive(Debug, Default)]
struct Counters {
    allowed: AtomicU64,
    throttled: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ThrottleMetrics {
        let allowed = self.allowed.load(Ordering::Relaxed);
        let throttled = self.throttled.load(Ordering::Relaxed);
        ThrottleMetrics {
            total_requests: allowed + throttled,
            allowed_requests: allowed,
            throttled_requests: throttled,
        }
    }
}

/// Allowed/throttled totals per limiter since startup.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    orders: Arc<Counters>,
    requests: Arc<Counters>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: LimiterKind, allowed: bool) {
        let counters = self.counters(kind);
        if allowed {
            counters.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            counters.throttled.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get(&self, kind: LimiterKind) -> ThrottleMetrics {
        self.counters(kind).snapshot()
    }

    fn counters(&self, kind: LimiterKind) -> &Counters {
        match kind {
            LimiterKind::Orders => &self.orders,
            LimiterKind::Requests => &self.requests,
        }
    }
}
