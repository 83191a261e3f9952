// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod bank_finance;
pub mod bank_finance_tally;
pub mod bank_tally;
pub mod export;
pub mod help;
pub mod reports;

pub use bank_finance::{BankFinanceOutcome, BankFinanceReconciler};
pub use bank_finance_tally::{BankFinanceTallyOutcome, BankFinanceTallyReconciler};
pub use bank_tally::{BankTallyOutcome, BankTallyReconciler};
pub use reports::ReportKind;

use chrono::NaiveDateTime;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::time_utils::run_tag_stamp;

/// Shared reconciliation locks for use in AppState.
///
/// Every bank has a reader-writer lock and every `(bank_code, account)` a
/// mutex. A run on one account holds the bank's read side and the account's
/// mutex; a bank-wide run holds the bank's write side, which excludes every
/// account run of that bank. Locks are held from loading candidates until
/// the results are committed, so two runs can never claim the same rows.
#[derive(Clone, Default)]
pub struct ReconcileLocks {
    banks: Arc<DashMap<String, Arc<RwLock<()>>>>,
    accounts: Arc<DashMap<(String, String), Arc<Mutex<()>>>>,
}

/// Held for the duration of one reconciliation run.
#[derive(Debug)]
pub enum ReconcileGuard {
    Account {
        _bank: OwnedRwLockReadGuard<()>,
        _account: OwnedMutexGuard<()>,
    },
    Bank(OwnedRwLockWriteGuard<()>),
}

impl ReconcileLocks {
    fn bank(&self, bank_code: &str) -> Arc<RwLock<()>> {
        self.banks
            .entry(bank_code.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    fn account(&self, bank_code: &str, account: &str) -> Arc<Mutex<()>> {
        self.accounts
            .entry((bank_code.to_string(), account.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Wait for exclusive use of one account, or of the whole bank when
    /// `account` is `None`.
    pub async fn acquire(&self, bank_code: &str, account: Option<&str>) -> ReconcileGuard {
        let bank = self.bank(bank_code);
        match account {
            Some(account) => {
                // Bank side first, always in this order.
                let bank = bank.read_owned().await;
                let account = self.account(bank_code, account).lock_owned().await;
                ReconcileGuard::Account {
                    _bank: bank,
                    _account: account,
                }
            }
            None => ReconcileGuard::Bank(bank.write_owned().await),
        }
    }
}

/// Identifier shared by every match id written in one run.
pub fn run_tag(bank_code: &str, account: &str, at: NaiveDateTime) -> String {
    format!("{bank_code}_{account}_{}", run_tag_stamp(at))
}

/// Sequential match id within a run, e.g. `BFM_<run_tag>_0001`.
pub fn match_id(prefix: &str, run_tag: &str, n: usize) -> String {
    format!("{prefix}_{run_tag}_{n:04}")
}
