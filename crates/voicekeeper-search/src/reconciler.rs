//! The periodic reconciler task.
//!
//! A fixed-period sweep driving [`SearchService::reconcile_pass`]. The
//! task is owned through a [`ReconcilerHandle`] so the embedder can stop
//! it cleanly, and tests can skip it entirely and drive passes by hand.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use voicekeeper_gateway::Gateway;

use crate::SearchService;

/// Maximum random delay before the first pass, to desynchronize
/// processes that start together.
const START_JITTER_MS: u64 = 2_000;

/// Cancellation handle for a running reconciler.
pub struct ReconcilerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Stops the reconciler and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawns the reconciler at the service's configured period.
pub fn spawn_reconciler<G: Gateway>(
    service: Arc<SearchService<G>>,
) -> ReconcilerHandle {
    let (tx, mut rx) = watch::channel(false);
    let period = service.config().period;

    let task = tokio::spawn(async move {
        let jitter_ms: u64 = rand::rng().random_range(0..START_JITTER_MS);
        tokio::time::sleep(Duration::from_millis(jitter_ms)).await;

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::debug!(period_secs = period.as_secs(), "search reconciler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let summary = service.reconcile_pass().await;
                    if summary.retired > 0 {
                        tracing::info!(
                            retired = summary.retired,
                            refreshed = summary.refreshed,
                            "reconcile pass retired stale searches"
                        );
                    }
                }
                changed = rx.changed() => {
                    if changed.is_err() || *rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("search reconciler stopped");
    });

    ReconcilerHandle { shutdown: tx, task }
}
