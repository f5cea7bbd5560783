//! In-memory [`Ledger`] used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::{GymError, Result};
use crate::ledger::Ledger;
use crate::types::{TxReceipt, UserProfile};
use crate::units::ExchangeRate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Submission {
    Buy { base_units: U256, wei_value: U256 },
    Sell { base_units: U256 },
    Transfer { to: Address, base_units: U256 },
    Register { username: String, email: String },
    UpdateProfile { username: String, email: String },
    SetRates { sell: U256, buy: U256 },
}

/// Simulates just enough of the token contract to exercise the client:
/// submissions move balances immediately and always confirm unless told
/// otherwise.
pub(crate) struct MockLedger {
    sender: Address,
    balances: Mutex<HashMap<Address, U256>>,
    eth_balance: Mutex<U256>,
    rates: Mutex<ExchangeRate>,
    profiles: Mutex<HashMap<Address, UserProfile>>,
    scripted_reads: Mutex<VecDeque<(U256, Duration)>>,
    submissions: Mutex<Vec<Submission>>,
    balance_reads: AtomicUsize,
    fail_reads: AtomicBool,
    reject_submissions: AtomicBool,
    revert_transactions: AtomicBool,
    next_hash: AtomicU64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            sender: Address::repeat_byte(0x5e),
            balances: Mutex::new(HashMap::new()),
            eth_balance: Mutex::new(U256::ZERO),
            rates: Mutex::new(
                ExchangeRate::new(U256::from(1u64), U256::from(1u64), U256::from(10_000_000u64))
                    .unwrap(),
            ),
            profiles: Mutex::new(HashMap::new()),
            scripted_reads: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
            balance_reads: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            reject_submissions: AtomicBool::new(false),
            revert_transactions: AtomicBool::new(false),
            next_hash: AtomicU64::new(1),
        }
    }

    pub fn set_balance(&self, address: Address, amount: U256) {
        self.balances.lock().unwrap().insert(address, amount);
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.lock().unwrap().get(&address).copied().unwrap_or_default()
    }

    pub fn set_eth_balance(&self, wei: U256) {
        *self.eth_balance.lock().unwrap() = wei;
    }

    pub fn set_rates(&self, rates: ExchangeRate) {
        *self.rates.lock().unwrap() = rates;
    }

    pub fn set_profile(&self, profile: UserProfile) {
        self.profiles.lock().unwrap().insert(profile.wallet, profile);
    }

    /// Queue a response for the next balance read, delivered after `delay`.
    pub fn script_read(&self, amount: U256, delay: Duration) {
        self.scripted_reads.lock().unwrap().push_back((amount, delay));
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn reject_submissions(&self, reject: bool) {
        self.reject_submissions.store(reject, Ordering::SeqCst);
    }

    pub fn revert_transactions(&self, revert: bool) {
        self.revert_transactions.store(revert, Ordering::SeqCst);
    }

    pub fn balance_reads(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn submit(&self, submission: Submission) -> Result<B256> {
        if self.reject_submissions.load(Ordering::SeqCst) {
            return Err(GymError::UserRejected("user denied transaction signature".into()));
        }
        if !self.revert_transactions.load(Ordering::SeqCst) {
            self.settle(&submission);
        }
        self.submissions.lock().unwrap().push(submission);
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst);
        Ok(B256::left_padding_from(&n.to_be_bytes()))
    }

    fn settle(&self, submission: &Submission) {
        let mut balances = self.balances.lock().unwrap();
        let sender = self.sender;
        match submission {
            Submission::Buy { base_units, .. } => {
                *balances.entry(sender).or_default() += *base_units;
            }
            Submission::Sell { base_units } => {
                *balances.entry(sender).or_default() -= *base_units;
            }
            Submission::Transfer { to, base_units } => {
                *balances.entry(sender).or_default() -= *base_units;
                *balances.entry(*to).or_default() += *base_units;
            }
            Submission::Register { username, email }
            | Submission::UpdateProfile { username, email } => {
                self.profiles.lock().unwrap().insert(
                    sender,
                    UserProfile {
                        username: username.clone(),
                        email: email.clone(),
                        wallet: sender,
                    },
                );
            }
            Submission::SetRates { sell, buy } => {
                let mut rates = self.rates.lock().unwrap();
                rates.sell_rate_units = *sell;
                rates.buy_rate_units = *buy;
            }
        }
    }
}

#[async_trait]
impl Ledger for MockLedger {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn read_balance(&self, address: Address) -> Result<U256> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GymError::LedgerUnavailable("connection refused".into()));
        }
        let scripted = self.scripted_reads.lock().unwrap().pop_front();
        match scripted {
            Some((amount, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(amount)
            }
            None => Ok(self.balance_of(address)),
        }
    }

    async fn read_eth_balance(&self, _address: Address) -> Result<U256> {
        Ok(*self.eth_balance.lock().unwrap())
    }

    async fn read_rates(&self) -> Result<ExchangeRate> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GymError::LedgerUnavailable("connection refused".into()));
        }
        Ok(*self.rates.lock().unwrap())
    }

    async fn read_profile(&self, address: Address) -> Result<UserProfile> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .get(&address)
            .cloned()
            .unwrap_or_else(|| UserProfile::unregistered(address)))
    }

    async fn submit_buy(&self, base_units: U256, wei_value: U256) -> Result<B256> {
        self.submit(Submission::Buy {
            base_units,
            wei_value,
        })
    }

    async fn submit_sell(&self, base_units: U256) -> Result<B256> {
        self.submit(Submission::Sell { base_units })
    }

    async fn submit_transfer(&self, recipient: Address, base_units: U256) -> Result<B256> {
        self.submit(Submission::Transfer {
            to: recipient,
            base_units,
        })
    }

    async fn submit_register(&self, username: &str, email: &str) -> Result<B256> {
        self.submit(Submission::Register {
            username: username.into(),
            email: email.into(),
        })
    }

    async fn submit_update_profile(&self, username: &str, email: &str) -> Result<B256> {
        self.submit(Submission::UpdateProfile {
            username: username.into(),
            email: email.into(),
        })
    }

    async fn submit_set_rates(&self, sell_rate_units: U256, buy_rate_units: U256) -> Result<B256> {
        self.submit(Submission::SetRates {
            sell: sell_rate_units,
            buy: buy_rate_units,
        })
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt> {
        if self.revert_transactions.load(Ordering::SeqCst) {
            return Err(GymError::TransactionReverted(hash));
        }
        Ok(TxReceipt {
            transaction_hash: hash,
            block_number: Some(U256::from(1u64)),
            status: Some(U256::from(1u64)),
            gas_used: None,
        })
    }
}
