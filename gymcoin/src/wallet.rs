//! User-facing token flows built from the ledger, cache, guard and history.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tracing::{info, warn};

use crate::cache::BalanceCache;
use crate::error::{GymError, Result};
use crate::guard;
use crate::history::{TransactionKind, TransactionLog};
use crate::ledger::Ledger;
use crate::types::{BalanceSnapshot, TxReceipt, UserProfile};
use crate::units::{ExchangeRate, TokenAmount};

/// Price of an amount at the current rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub amount: TokenAmount,
    /// Wei charged to buy `amount`.
    pub buy_cost: U256,
    /// Wei paid out for selling `amount`.
    pub sell_proceeds: U256,
    pub rates: ExchangeRate,
}

/// A confirmed submission.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    /// Id of the matching [`TransactionLog`] record.
    pub record_id: u64,
    pub hash: B256,
    pub receipt: TxReceipt,
}

pub struct TokenWallet {
    ledger: Arc<dyn Ledger>,
    cache: Arc<BalanceCache>,
    history: Arc<TransactionLog>,
}

impl TokenWallet {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        let cache = Arc::new(BalanceCache::new(Arc::clone(&ledger)));
        Self::with_cache(ledger, cache)
    }

    /// Share an existing cache, e.g. one a poller is already feeding.
    pub fn with_cache(ledger: Arc<dyn Ledger>, cache: Arc<BalanceCache>) -> Self {
        Self {
            ledger,
            cache,
            history: Arc::new(TransactionLog::new()),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn cache(&self) -> &Arc<BalanceCache> {
        &self.cache
    }

    pub fn history(&self) -> &Arc<TransactionLog> {
        &self.history
    }

    pub fn sender(&self) -> Address {
        self.ledger.sender()
    }

    pub async fn rates(&self) -> Result<ExchangeRate> {
        self.ledger.read_rates().await
    }

    pub async fn quote(&self, amount: &str) -> Result<Quote> {
        let amount = guard::check_amount(amount)?;
        let rates = self.ledger.read_rates().await?;
        Ok(Quote {
            amount,
            buy_cost: rates.buy_cost(&amount)?,
            sell_proceeds: rates.sell_proceeds(&amount)?,
            rates,
        })
    }

    /// Cached token balance of the sender, reading through on a miss.
    pub async fn token_balance(&self) -> Result<Arc<BalanceSnapshot>> {
        let sender = self.sender();
        match self.cache.get(&sender) {
            Some(snapshot) => Ok(snapshot),
            None => self.cache.refresh_address(sender).await,
        }
    }

    pub async fn eth_balance(&self) -> Result<U256> {
        self.ledger.read_eth_balance(self.sender()).await
    }

    pub async fn profile(&self, address: Address) -> Result<UserProfile> {
        self.ledger.read_profile(address).await
    }

    /// Buy `amount` tokens, paying ETH at the current buy rate.
    pub async fn buy(&self, amount: &str) -> Result<TxOutcome> {
        let requested = guard::check_amount(amount)?;
        let (rates, eth) = tokio::try_join!(self.ledger.read_rates(), self.eth_balance())?;
        let cost = rates.buy_cost(&requested)?;
        let amount = guard::check_buy(amount, eth, cost)?;

        let base_units = amount.base_units();
        self.execute(TransactionKind::Buy, Some(amount), None, || {
            self.ledger.submit_buy(base_units, cost)
        })
        .await
    }

    /// Sell `amount` tokens back to the contract.
    pub async fn sell(&self, amount: &str) -> Result<TxOutcome> {
        guard::check_amount(amount)?;
        let balance = self.token_balance().await?;
        let amount = guard::check_sell(amount, balance.amount)?;

        let base_units = amount.base_units();
        self.execute(TransactionKind::Sell, Some(amount), None, || {
            self.ledger.submit_sell(base_units)
        })
        .await
    }

    pub async fn transfer(&self, recipient: &str, amount: &str) -> Result<TxOutcome> {
        guard::check_amount(amount)?;
        guard::check_recipient(recipient)?;
        let balance = self.token_balance().await?;
        let (amount, to) = guard::check_transfer(amount, balance.amount, recipient)?;

        let base_units = amount.base_units();
        let outcome = self
            .execute(TransactionKind::Transfer, Some(amount), Some(to), || {
                self.ledger.submit_transfer(to, base_units)
            })
            .await?;
        if let Err(e) = self.cache.refresh_address(to).await {
            warn!(recipient = %to, error = %e, "recipient balance refresh failed");
        }
        Ok(outcome)
    }

    /// Register the sender. Fails if a profile already exists.
    pub async fn register(&self, username: &str, email: &str) -> Result<TxOutcome> {
        let (username, email) = (username.trim(), email.trim());
        UserProfile::validate_registration(username, email)?;
        let existing = self.profile(self.sender()).await?;
        if existing.is_registered() {
            return Err(GymError::InvalidProfile(format!(
                "{} is already registered as {:?}",
                self.sender(),
                existing.username
            )));
        }
        self.execute(TransactionKind::Register, None, None, || {
            self.ledger.submit_register(username, email)
        })
        .await
    }

    pub async fn update_profile(&self, username: &str, email: &str) -> Result<TxOutcome> {
        let (username, email) = (username.trim(), email.trim());
        UserProfile::validate_registration(username, email)?;
        if self.profile(self.sender()).await?.needs_registration() {
            return Err(GymError::InvalidProfile(format!(
                "{} is not registered",
                self.sender()
            )));
        }
        self.execute(TransactionKind::UpdateProfile, None, None, || {
            self.ledger.submit_update_profile(username, email)
        })
        .await
    }

    /// Owner-only. Rates are raw contract units, scaled by the divisor.
    pub async fn set_rates(&self, sell_rate_units: U256, buy_rate_units: U256) -> Result<TxOutcome> {
        if sell_rate_units.is_zero() || buy_rate_units.is_zero() {
            return Err(GymError::InvalidRate("rates must be positive".into()));
        }
        self.execute(TransactionKind::SetRates, None, None, || {
            self.ledger.submit_set_rates(sell_rate_units, buy_rate_units)
        })
        .await
    }

    /// Record, submit and confirm one transaction, then refresh the sender.
    ///
    /// Submission and confirmation errors mark the record failed and are
    /// returned unchanged; nothing is retried.
    async fn execute<F, Fut>(
        &self,
        kind: TransactionKind,
        amount: Option<TokenAmount>,
        to: Option<Address>,
        submit: F,
    ) -> Result<TxOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<B256>>,
    {
        let record_id = self.history.record(kind, amount, to);

        let confirmed = async {
            let hash = submit().await?;
            self.history.set_hash(record_id, hash);
            let receipt = self.ledger.wait_for_receipt(hash).await?;
            Ok::<_, GymError>((hash, receipt))
        }
        .await;

        let (hash, receipt) = match confirmed {
            Ok(done) => done,
            Err(e) => {
                warn!(?kind, record_id, error = %e, "transaction failed");
                self.history.fail(record_id, &e);
                return Err(e);
            }
        };

        self.history.complete(record_id);
        info!(?kind, record_id, %hash, "transaction completed");

        if let Err(e) = self.cache.refresh_address(self.sender()).await {
            warn!(error = %e, "post-transaction balance refresh failed");
        }

        Ok(TxOutcome {
            record_id,
            hash,
            receipt,
        })
    }
}
