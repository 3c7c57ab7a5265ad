//! Rate limiting algorithms module
//!
//! Policy types shared by the window counters, and the decision they return.

pub mod sliding_window;

use crate::error::{ThrottlerError, ThrottlerResult};
use crate::response::Rejection;
use serde::Serialize;
use std::time::Duration;

pub use sliding_window::WindowCounter;

/// Window length and capacity of one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowPolicy {
    #[serde(with = "humantime_serde")]
    window: Duration,
    max_events: u32,
}

impl WindowPolicy {
    /// Rejects a zero window or a capacity below one.
    pub fn new(window: Duration, max_events: u32) -> ThrottlerResult<Self> {
        if max_events == 0 {
            return Err(ThrottlerError::Validation(
                "max_events must be at least 1".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(ThrottlerError::Validation(
                "window must be greater than 0".to_string(),
            ));
        }
        Ok(Self { window, max_events })
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn window_ms(&self) -> u64 {
        self.window.as_millis() as u64
    }

    pub fn max_events(&self) -> u32 {
        self.max_events
    }
}

/// How a counter computes `retry_after_seconds` on denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    /// Time until the oldest retained event leaves the window.
    OldestEvent,
    /// A constant number of seconds.
    Fixed(u64),
}

/// Builds the rejection a counter returns once its capacity is used up.
#[derive(Debug, Clone)]
pub struct LimitExceededResponse {
    message: String,
    retry_after: RetryAfter,
}

impl LimitExceededResponse {
    pub fn new(message: impl Into<String>, retry_after: RetryAfter) -> Self {
        Self {
            message: message.into(),
            retry_after,
        }
    }

    /// `until_oldest_expires_secs` is only used by [`RetryAfter::OldestEvent`].
    pub fn build(&self, until_oldest_expires_secs: u64) -> Rejection {
        let retry_after_seconds = match self.retry_after {
            RetryAfter::OldestEvent => until_oldest_expires_secs,
            RetryAfter::Fixed(secs) => secs,
        };
        Rejection::too_many_requests(self.message.clone(), retry_after_seconds)
    }
}

/// Outcome of recording an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The event was counted; `count` is the number of events now in the window.
    Allowed { count: usize },
    /// Capacity reached; nothing was recorded.
    Denied(Rejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::Denied(rejection) => Some(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_requires_at_least_one_event() {
        assert!(WindowPolicy::new(Duration::from_secs(60), 0).is_err());
        assert!(WindowPolicy::new(Duration::ZERO, 5).is_err());

        let policy = WindowPolicy::new(Duration::from_secs(60), 1).unwrap();
        assert!(policy.max_events() >= 1);
        assert_eq!(policy.window_ms(), 60_000);
    }

    #[test]
    fn test_policy_serializes_human_readable_window() {
        let policy = WindowPolicy::new(Duration::from_secs(3600), 5).unwrap();
        let json = serde_json::to_value(policy).unwrap();
        assert_eq!(json["window"], "1h");
        assert_eq!(json["max_events"], 5);
    }

    #[test]
    fn test_fixed_retry_after_ignores_computed_value() {
        let fixed = LimitExceededResponse::new("slow down", RetryAfter::Fixed(60));
        assert_eq!(fixed.build(12).retry_after_seconds, 60);

        let oldest = LimitExceededResponse::new("slow down", RetryAfter::OldestEvent);
        assert_eq!(oldest.build(12).retry_after_seconds, 12);
    }
}
