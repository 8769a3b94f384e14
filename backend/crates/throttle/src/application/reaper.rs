//! Background eviction of idle client trackers

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::limiter::RateLimiter;

/// `tokio::time::interval` rejects a zero period
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to the periodic reaper task.
///
/// Dropping the handle without calling [`stop`](Self::stop) also ends the
/// task at its next wake-up, but only `stop` waits for it to finish.
pub struct Reaper {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Spawn the reaper on the current tokio runtime.
    ///
    /// The first pass runs one full `every` after spawning.
    pub fn spawn(limiter: Arc<RateLimiter>, every: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields immediately on the first tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let stats = limiter.reap();
                        tracing::debug!(
                            evicted = stats.evicted,
                            remaining = stats.remaining,
                            "Rate limit trackers reaped"
                        );
                    }
                }
            }

            tracing::debug!("Rate limit reaper stopped");
        });

        tracing::info!(interval = ?every, "Rate limit reaper started");
        Self { stop_tx, handle }
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Rate limit reaper ended abnormally");
        }
    }
}
