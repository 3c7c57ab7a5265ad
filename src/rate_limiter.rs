use crate::algorithms::{Decision, LimitExceededResponse, RetryAfter, WindowCounter, WindowPolicy};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::ThrottlerResult;
use serde::Serialize;
use std::sync::Arc;

pub const ORDER_LIMIT_MESSAGE: &str =
    "Too many orders from this address. Please wait before placing another order.";
pub const REQUEST_LIMIT_MESSAGE: &str =
    "Too many requests. Please slow down and try again shortly.";

/// Which of the two counters a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterKind {
    Orders,
    Requests,
}

impl LimiterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimiterKind::Orders => "orders",
            LimiterKind::Requests => "requests",
        }
    }
}

/// Owns the order and request counters.
///
/// Built once at startup and shared by the HTTP middleware and the cleanup
/// scheduler; callers only see per-key checks and the purge pass.
pub struct RateLimiter {
    orders: WindowCounter,
    requests: WindowCounter,
}

/// Keys removed from each counter by one purge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub orders_removed: usize,
    pub requests_removed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LimiterStats {
    pub limiter: LimiterKind,
    pub policy: WindowPolicy,
    pub tracked_keys: usize,
}

impl RateLimiter {
    pub fn new(config: &Config) -> ThrottlerResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> ThrottlerResult<Self> {
        let orders = WindowCounter::new(
            WindowPolicy::new(config.order_window(), config.order_max_events)?,
            LimitExceededResponse::new(ORDER_LIMIT_MESSAGE, RetryAfter::OldestEvent),
            Arc::clone(&clock),
        );
        let requests = WindowCounter::new(
            WindowPolicy::new(config.request_window(), config.request_max_events)?,
            LimitExceededResponse::new(
                REQUEST_LIMIT_MESSAGE,
                RetryAfter::Fixed(config.request_retry_after_secs),
            ),
            clock,
        );

        Ok(Self { orders, requests })
    }

    /// Count an order-creation attempt for `client_key`.
    pub fn check_order(&self, client_key: &str) -> Decision {
        self.orders.try_record_event(client_key)
    }

    /// Count a general API request for `client_key`.
    pub fn check_request(&self, client_key: &str) -> Decision {
        self.requests.try_record_event(client_key)
    }

    pub fn check(&self, kind: LimiterKind, client_key: &str) -> Decision {
        self.counter(kind).try_record_event(client_key)
    }

    pub fn policy(&self, kind: LimiterKind) -> WindowPolicy {
        self.counter(kind).policy()
    }

    pub fn count(&self, kind: LimiterKind, client_key: &str) -> usize {
        self.counter(kind).count(client_key)
    }

    /// Drop expired events from both counters, each against its own window.
    pub fn purge_expired(&self) -> PurgeReport {
        PurgeReport {
            orders_removed: self.orders.purge_expired(),
            requests_removed: self.requests.purge_expired(),
        }
    }

    pub fn stats(&self) -> Vec<LimiterStats> {
        [LimiterKind::Orders, LimiterKind::Requests]
            .into_iter()
            .map(|kind| {
                let counter = self.counter(kind);
                LimiterStats {
                    limiter: kind,
                    policy: counter.policy(),
                    tracked_keys: counter.tracked_keys(),
                }
            })
            .collect()
    }

    fn counter(&self, kind: LimiterKind) -> &WindowCounter {
        match kind {
            LimiterKind::Orders => &self.orders,
            LimiterKind::Requests => &self.requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    const T0: u64 = 1_700_000_000_000;

    fn limiter() -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new(T0);
        let limiter = RateLimiter::with_clock(&Config::default(), Arc::new(clock.clone())).unwrap();
        (limiter, clock)
    }

    #[test]
    fn test_default_policies() {
        let (limiter, _clock) = limiter();

        let orders = limiter.policy(LimiterKind::Orders);
        assert_eq!(orders.window(), Duration::from_secs(3600));
        assert_eq!(orders.max_events(), 5);

        let requests = limiter.policy(LimiterKind::Requests);
        assert_eq!(requests.window(), Duration::from_secs(60));
        assert_eq!(requests.max_events(), 30);

        assert!(orders.max_events() >= 1 && requests.max_events() >= 1);
    }

    #[test]
    fn test_order_limiter_scenario() {
        let (limiter, clock) = limiter();

        for i in 0..5 {
            assert_eq!(limiter.check_order("198.51.100.4"), Decision::Allowed { count: i + 1 });
            clock.advance(Duration::from_secs(1));
        }

        let decision = limiter.check_order("198.51.100.4");
        let rejection = decision.rejection().unwrap();
        assert_eq!(rejection.retry_after_seconds, 3595);
        assert_eq!(rejection.message, ORDER_LIMIT_MESSAGE);
    }

    #[test]
    fn test_request_limiter_uses_flat_retry_after() {
        let (limiter, clock) = limiter();

        for _ in 0..30 {
            assert!(limiter.check_request("203.0.113.9").is_allowed());
            clock.advance(Duration::from_millis(500));
        }

        let decision = limiter.check_request("203.0.113.9");
        let rejection = decision.rejection().unwrap();
        assert_eq!(rejection.retry_after_seconds, 60);
        assert_eq!(rejection.status_code, 429);
        assert_eq!(rejection.message, REQUEST_LIMIT_MESSAGE);
    }

    #[test]
    fn test_counters_are_independent() {
        let (limiter, _clock) = limiter();

        for _ in 0..5 {
            limiter.check_order("k");
        }
        assert!(!limiter.check_order("k").is_allowed());
        assert_eq!(limiter.check_request("k"), Decision::Allowed { count: 1 });
        assert_eq!(limiter.count(LimiterKind::Orders, "k"), 5);
        assert_eq!(limiter.count(LimiterKind::Requests, "k"), 1);
    }

    #[test]
    fn test_purge_uses_each_counters_window() {
        let (limiter, clock) = limiter();

        limiter.check_order("k");
        limiter.check_request("k");
        clock.advance(Duration::from_secs(61));

        let report = limiter.purge_expired();
        assert_eq!(
            report,
            PurgeReport {
                orders_removed: 0,
                requests_removed: 1
            }
        );

        let stats = limiter.stats();
        assert_eq!(stats[0].limiter, LimiterKind::Orders);
        assert_eq!(stats[0].tracked_keys, 1);
        assert_eq!(stats[1].tracked_keys, 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            order_max_events: 0,
            ..Config::default()
        };
        assert!(RateLimiter::new(&config).is_err());
    }
}
