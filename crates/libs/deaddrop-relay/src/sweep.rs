use crate::clock::Clock;
use crate::store::{MessageStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Recurring purge of staged messages past their retention deadline.
///
/// Expiry is a retention bound, not a validity bound: a message can still be
/// delivered between its deadline and the next sweep, and the delivering
/// task's delete racing the sweeper's is resolved by idempotent delete.
pub struct ExpirySweeper {
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self { store, clock, interval }
    }

    /// One sweep pass. Returns how many staged messages were purged.
    pub fn run_once(&self) -> Result<u64, StoreError> {
        let removed = self.store.delete_expired(self.clock.now())?;
        if removed > 0 {
            log::info!("sweep: purged {removed} expired staged message(s)");
        }
        Ok(removed)
    }

    /// Run the sweeper until cancelled. An interval of zero disables it. A
    /// failed pass only delays cleanup, so it is logged and the loop keeps
    /// ticking.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.interval.is_zero() {
                return;
            }

            let mut interval = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::debug!("sweep: cancelled, worker exiting");
                        break;
                    }
                    // First tick is immediate, so one pass runs at startup.
                    _ = interval.tick() => {
                        if let Err(err) = self.run_once() {
                            log::warn!("sweep: pass failed: {err}");
                        }
                    }
                }
            }
        })
    }
}
