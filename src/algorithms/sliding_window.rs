//! Sliding window rate limiting algorithm
//!
//! Keeps the timestamp of every accepted event per client key and counts
//! how many of them are still inside the window. Expired timestamps are
//! dropped lazily when a key is touched and eagerly by [`WindowCounter::purge_expired`].

use super::{Decision, LimitExceededResponse, WindowPolicy};
use crate::clock::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Accepted event timestamps for one client key, in epoch milliseconds.
type EventLog = Vec<u64>;

/// Per-client sliding window event counter.
pub struct WindowCounter {
    policy: WindowPolicy,
    on_limit: LimitExceededResponse,
    clock: Arc<dyn Clock>,
    logs: Mutex<HashMap<String, EventLog>>,
}

impl WindowCounter {
    pub fn new(
        policy: WindowPolicy,
        on_limit: LimitExceededResponse,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            policy,
            on_limit,
            clock,
            logs: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    /// Record one event for `client_key` unless its window is already full.
    ///
    /// The whole read-filter-append runs under the map lock, so concurrent
    /// calls for the same key cannot both see room for one more event.
    /// Denied events are not recorded. Keys are never removed here, even
    /// when their log filters down to nothing.
    pub fn try_record_event(&self, client_key: &str) -> Decision {
        let window_ms = self.policy.window_ms();
        let mut logs = self.lock();
        let now = self.clock.now_ms();

        let mut log = logs.remove(client_key).unwrap_or_default();
        retain_in_window(&mut log, now, window_ms);

        let decision = if log.len() >= self.policy.max_events() as usize {
            // The log cannot be empty here since max_events >= 1.
            let oldest = log.iter().copied().min().unwrap_or(now);
            let until_expiry_ms = (oldest + window_ms).saturating_sub(now);
            Decision::Denied(self.on_limit.build(until_expiry_ms.div_ceil(1000)))
        } else {
            log.push(now);
            Decision::Allowed { count: log.len() }
        };

        logs.insert(client_key.to_string(), log);
        decision
    }

    /// Number of events currently inside the window for `client_key`.
    pub fn count(&self, client_key: &str) -> usize {
        let window_ms = self.policy.window_ms();
        let logs = self.lock();
        let now = self.clock.now_ms();

        logs.get(client_key)
            .map(|log| log.iter().filter(|&&ts| in_window(ts, now, window_ms)).count())
            .unwrap_or(0)
    }

    /// Filter every log by the window and remove keys left with no events.
    ///
    /// Returns the number of keys removed.
    pub fn purge_expired(&self) -> usize {
        let window_ms = self.policy.window_ms();
        let mut logs = self.lock();
        let now = self.clock.now_ms();

        let before = logs.len();
        logs.retain(|_, log| {
            retain_in_window(log, now, window_ms);
            !log.is_empty()
        });
        before - logs.len()
    }

    /// Number of client keys currently tracked, including ones whose
    /// events have expired but were not purged yet.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock cannot leave a log half-written in a
    // way that matters to counting, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, EventLog>> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An event is inside the window while it is less than `window_ms` old.
/// Timestamps ahead of `now` (clock stepped back) count as fresh.
fn in_window(timestamp: u64, now: u64, window_ms: u64) -> bool {
    now.saturating_sub(timestamp) < window_ms
}

fn retain_in_window(log: &mut EventLog, now: u64, window_ms: u64) {
    log.retain(|&ts| in_window(ts, now, window_ms));
}
