//! Local record of operations submitted from this client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GymError;
use crate::units::TokenAmount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    Transfer,
    Register,
    UpdateProfile,
    SetRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: u64,
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<TokenAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<B256>,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only list of submitted operations, newest last.
#[derive(Debug, Default)]
pub struct TransactionLog {
    records: Mutex<Vec<TransactionRecord>>,
    next_id: AtomicU64,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn records_mut(&self) -> MutexGuard<'_, Vec<TransactionRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a pending record and return its id.
    pub fn record(&self, kind: TransactionKind, amount: Option<TokenAmount>, to: Option<Address>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.records_mut().push(TransactionRecord {
            id,
            kind,
            amount,
            to,
            hash: None,
            status: TransactionStatus::Pending,
            error: None,
            timestamp: Utc::now(),
        });
        id
    }

    fn update(&self, id: u64, f: impl FnOnce(&mut TransactionRecord)) {
        if let Some(record) = self.records_mut().iter_mut().find(|r| r.id == id) {
            f(record);
        }
    }

    pub fn set_hash(&self, id: u64, hash: B256) {
        self.update(id, |r| r.hash = Some(hash));
    }

    pub fn complete(&self, id: u64) {
        self.update(id, |r| r.status = TransactionStatus::Completed);
    }

    pub fn fail(&self, id: u64, error: &GymError) {
        self.update(id, |r| {
            r.status = TransactionStatus::Failed;
            r.error = Some(error.to_string());
        });
    }

    pub fn get(&self, id: u64) -> Option<TransactionRecord> {
        self.records_mut().iter().find(|r| r.id == id).cloned()
    }

    /// All records, most recent first.
    pub fn recent(&self) -> Vec<TransactionRecord> {
        let mut records = self.records_mut().clone();
        records.reverse();
        records
    }

    pub fn len(&self) -> usize {
        self.records_mut().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
