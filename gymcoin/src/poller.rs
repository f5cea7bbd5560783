//! Periodic balance refresh with cancellation.
//!
//! Each schedule is a tokio task that refreshes once immediately and then on
//! every interval tick until its token is cancelled. A failed tick is logged
//! and the schedule carries on. Cancelling never aborts a read that is
//! already in flight; its result is discarded when it arrives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use alloy_primitives::Address;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::cache::BalanceCache;
use crate::types::BalanceSnapshot;

/// Shortest interval a schedule will run at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to one running schedule.
#[derive(Debug, Clone)]
pub struct PollHandle {
    id: u64,
    address: Address,
    token: CancellationToken,
}

impl PollHandle {
    /// Stop the schedule. Safe to call any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Cancel the schedule when the returned guard goes out of scope.
    pub fn drop_guard(self) -> DropGuard {
        self.token.drop_guard()
    }
}

/// Runs at most one balance schedule per address.
pub struct PollingScheduler {
    cache: Arc<BalanceCache>,
    root: CancellationToken,
    active: Mutex<HashMap<Address, (u64, CancellationToken)>>,
    next_id: AtomicU64,
}

impl PollingScheduler {
    pub fn new(cache: Arc<BalanceCache>) -> Self {
        Self {
            cache,
            root: CancellationToken::new(),
            active: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn active(&self) -> MutexGuard<'_, HashMap<Address, (u64, CancellationToken)>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start refreshing `address` every `interval`, passing each applied
    /// snapshot to `callback`.
    ///
    /// A schedule already running for `address` is cancelled first. Must be
    /// called from within a tokio runtime.
    pub fn start<F>(&self, address: Address, interval: Duration, callback: F) -> PollHandle
    where
        F: Fn(Arc<BalanceSnapshot>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.root.child_token();

        if let Some((prior_id, prior)) = self.active().insert(address, (id, token.clone())) {
            debug!(%address, prior_id, "replacing existing balance schedule");
            prior.cancel();
        }

        let cache = Arc::clone(&self.cache);
        let task_token = token.clone();
        let interval = interval.max(MIN_POLL_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => {
                        debug!(%address, id, "balance polling stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        match cache.refresh_while_active(address, &task_token).await {
                            Ok(Some(snapshot)) => callback(snapshot),
                            Ok(None) => {}
                            Err(e) => warn!(%address, error = %e, "balance poll failed"),
                        }
                    }
                }
            }
        });

        debug!(%address, id, interval_ms = interval.as_millis() as u64, "balance polling started");
        PollHandle { id, address, token }
    }

    /// Stop the schedule behind `handle`. Idempotent.
    pub fn cancel(&self, handle: &PollHandle) {
        handle.cancel();
        let mut active = self.active();
        if active
            .get(&handle.address)
            .is_some_and(|(id, _)| *id == handle.id)
        {
            active.remove(&handle.address);
        }
    }

    /// Whether a live schedule exists for `address`.
    pub fn is_polling(&self, address: &Address) -> bool {
        self.active()
            .get(address)
            .is_some_and(|(_, token)| !token.is_cancelled())
    }

    /// Cancel every schedule started by this scheduler.
    pub fn shutdown(&self) {
        self.root.cancel();
        self.active().clear();
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
