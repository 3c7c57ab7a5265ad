//! Periodic purge of expired client identities.

use crate::rate_limiter::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Background task that runs [`RateLimiter::purge_expired`] on a fixed period.
///
/// The task runs until [`CleanupScheduler::shutdown`] is called.
pub struct CleanupScheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CleanupScheduler {
    /// Spawn the task on the current tokio runtime. The first purge runs
    /// one full `period` after spawning.
    pub fn spawn(limiter: Arc<RateLimiter>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = limiter.purge_expired();
                        debug!(
                            target: "shop_throttler::cleanup",
                            orders_removed = report.orders_removed,
                            requests_removed = report.requests_removed,
                            "Purged expired client identities"
                        );
                    }
                    // Also fires if the sender is dropped.
                    _ = shutdown_rx.changed() => break,
                }
            }

            debug!(target: "shop_throttler::cleanup", "Cleanup scheduler stopped");
        });

        info!(
            target: "shop_throttler::cleanup",
            period_ms = period.as_millis() as u64,
            "Cleanup scheduler started"
        );

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
