//! Last-known token balance per address, with change notification.
//!
//! Every refresh draws a sequence number before it reads. When the read
//! resolves, the result is applied only if no refresh with a higher number
//! has been applied for that address already, so a slow response can never
//! overwrite a fresher one. Snapshots are swapped in as whole `Arc`s; the
//! mutex is never held across an `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{Address, U256};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::address::{is_placeholder, parse_address};
use crate::error::{GymError, Result};
use crate::ledger::Ledger;
use crate::types::BalanceSnapshot;

/// Identifies a registered change listener.
pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&BalanceSnapshot) + Send + Sync>;

#[derive(Default)]
struct Slot {
    snapshot: Option<Arc<BalanceSnapshot>>,
    applied_seq: u64,
}

#[derive(Default)]
struct State {
    slots: HashMap<Address, Slot>,
    listeners: HashMap<Address, Vec<(ListenerId, Listener)>>,
}

/// Per-address balance cache backed by a [`Ledger`].
pub struct BalanceCache {
    ledger: Arc<dyn Ledger>,
    state: Mutex<State>,
    next_seq: AtomicU64,
    next_listener: AtomicU64,
}

impl BalanceCache {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            state: Mutex::new(State::default()),
            next_seq: AtomicU64::new(1),
            next_listener: AtomicU64::new(1),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Last applied snapshot for `address`, if any.
    pub fn get(&self, address: &Address) -> Option<Arc<BalanceSnapshot>> {
        self.state()
            .slots
            .get(address)
            .and_then(|slot| slot.snapshot.clone())
    }

    /// Re-read the balance of `address` and update the cache.
    ///
    /// An empty or placeholder address is a no-op that returns `None`
    /// without touching the ledger.
    ///
    /// # Errors
    ///
    /// [`GymError::InvalidAddress`] for a malformed address, and
    /// [`GymError::LedgerUnavailable`] if the read fails. A failed read
    /// leaves the previous snapshot in place.
    pub async fn refresh(&self, address: &str) -> Result<Option<Arc<BalanceSnapshot>>> {
        if is_placeholder(address) {
            return Ok(None);
        }
        let address = parse_address(address.trim())?;
        self.refresh_inner(address, None).await
    }

    /// [`refresh`](Self::refresh) for an already parsed address.
    pub async fn refresh_address(&self, address: Address) -> Result<Arc<BalanceSnapshot>> {
        self.refresh_inner(address, None).await?.ok_or_else(|| {
            GymError::LedgerUnavailable(format!("no balance observed for {address}"))
        })
    }

    /// Refresh on behalf of a schedule; the result is dropped if `active` has
    /// been cancelled by the time the read resolves.
    pub(crate) async fn refresh_while_active(
        &self,
        address: Address,
        active: &CancellationToken,
    ) -> Result<Option<Arc<BalanceSnapshot>>> {
        self.refresh_inner(address, Some(active)).await
    }

    async fn refresh_inner(
        &self,
        address: Address,
        active: Option<&CancellationToken>,
    ) -> Result<Option<Arc<BalanceSnapshot>>> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);

        let amount = match self.ledger.read_balance(address).await {
            Ok(amount) => amount,
            Err(e) => {
                warn!(%address, seq, error = %e, "balance refresh failed, keeping last snapshot");
                return Err(match e {
                    e if e.is_recoverable() => e,
                    other => GymError::LedgerUnavailable(other.to_string()),
                });
            }
        };

        if active.is_some_and(|token| token.is_cancelled()) {
            debug!(%address, seq, "discarding balance read that finished after cancellation");
            return Ok(None);
        }

        Ok(Some(self.apply(address, seq, amount)))
    }

    /// Install the result of refresh `seq` unless a newer one already landed.
    fn apply(&self, address: Address, seq: u64, amount: U256) -> Arc<BalanceSnapshot> {
        let (snapshot, notify) = {
            let mut state = self.state();
            let slot = state.slots.entry(address).or_default();

            if seq < slot.applied_seq {
                debug!(%address, seq, applied = slot.applied_seq, "discarding stale balance read");
                if let Some(current) = &slot.snapshot {
                    return Arc::clone(current);
                }
            }

            let changed = slot
                .snapshot
                .as_ref()
                .is_some_and(|previous| previous.amount != amount);

            let snapshot = Arc::new(BalanceSnapshot {
                address,
                amount,
                observed_at: seq,
                observed_at_utc: Utc::now(),
            });
            slot.snapshot = Some(Arc::clone(&snapshot));
            slot.applied_seq = seq;

            let notify: Vec<Listener> = if changed {
                state
                    .listeners
                    .get(&address)
                    .map(|ls| ls.iter().map(|(_, l)| Arc::clone(l)).collect())
                    .unwrap_or_default()
            } else {
                Vec::new()
            };
            (snapshot, notify)
        };

        if !notify.is_empty() {
            debug!(%address, amount = %snapshot.amount, listeners = notify.len(), "balance changed");
        }
        for listener in notify {
            listener(&snapshot);
        }
        snapshot
    }

    /// Call `listener` once for every applied refresh that changes the
    /// balance of `address`.
    pub fn on_change<F>(&self, address: Address, listener: F) -> ListenerId
    where
        F: Fn(&BalanceSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.state()
            .listeners
            .entry(address)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if no listener had that id.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state();
        let mut removed = false;
        for listeners in state.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|(lid, _)| *lid != id);
            removed |= listeners.len() != before;
        }
        state.listeners.retain(|_, ls| !ls.is_empty());
        removed
    }
}
