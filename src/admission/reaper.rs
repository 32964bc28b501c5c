//! Stale request reaper
//!
//! Periodic sweep that deletes queued or completed requests nobody is
//! watching anymore, bounding memory growth from abandoned uploads. The task
//! is owned by `main` and stops through an explicit shutdown signal.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::notifiers::LiveNotifierSet;
use super::queue::AdmissionQueue;
use super::store::RequestStore;

pub struct Reaper {
    store: RequestStore,
    queue: AdmissionQueue,
    notifiers: LiveNotifierSet,
    interval: Duration,
    grace: Duration,
}

impl Reaper {
    pub fn new(
        store: RequestStore,
        queue: AdmissionQueue,
        notifiers: LiveNotifierSet,
        interval: Duration,
        grace: Duration,
    ) -> Self {
        Self {
            store,
            queue,
            notifiers,
            interval,
            grace,
        }
    }

    /// Run one sweep, returning the number of records reaped.
    pub fn sweep(&self) -> usize {
        let eligible = self.store.reapable(&self.notifiers, self.grace);
        let mut reaped = 0;

        for id in eligible {
            // Eligibility is re-checked at deletion time: a request admitted
            // to processing since the snapshot must not be deleted.
            if self.store.remove_if_reapable(id, &self.notifiers, self.grace) {
                self.queue.dequeue(id);
                reaped += 1;
                tracing::debug!(request_id = %id, "Reaped abandoned request");
            }
        }

        if reaped > 0 {
            tracing::info!(count = reaped, "Reaped abandoned requests");
        }
        reaped
    }

    /// Spawn the periodic sweep, stopping when `shutdown` fires.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick completes immediately; skip it so a fresh
            // process does not sweep at startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep();
                    }
                    _ = shutdown.changed() => {
                        tracing::debug!("Reaper shutting down");
                        break;
                    }
                }
            }
        })
    }
}
