// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bank ↔ finance reconciliation.
//!
//! Each unmatched bank withdrawal is paired with the finance payment(s) that
//! produced it. Four passes run in order, each only over what the earlier
//! passes left:
//! 1. 1-to-1 on the vendor prefix, amount and date
//! 2. 1-to-N on the vendor prefix and date, finance amounts summing to the
//!    bank amount
//! 3. 1-to-1 on the aliased vendor
//! 4. 1-to-N on the aliased vendor

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{match_id, run_tag, ReconcileLocks};
use crate::db::{BfGroupRows, Db};
use crate::error::Result;
use crate::models::{BankRecord, FinanceRecord};
use crate::money::opt_money;
use crate::time_utils::now_local;

/// Characters of the vendor name compared by the direct passes.
const VENDOR_PREFIX_LEN: usize = 5;

/// Most combinations examined for a single bank row in one 1-to-N pass.
pub const COMBINATION_BUDGET: usize = 250_000;

/// Per-bank spellings that differ between statement narrations and the
/// finance receiver name, as `(bank_code, bank vendor, finance vendor)`.
const VENDOR_ALIASES: &[(&str, &str, &str)] = &[
    ("MDB", "JOYNALANDSONS", "JOYNALSONS"),
    ("MDB", "TALIANDCO", "TALICO"),
    ("MTB", "BANKVENDOR", "FINVENDORALIAS"),
];

/// Bank vendor as known on the finance side.
pub fn vendor_alias(bank_code: &str, vendor: &str) -> String {
    let vendor = vendor.trim().to_uppercase();
    VENDOR_ALIASES
        .iter()
        .find(|(bank, from, _)| *bank == bank_code && *from == vendor)
        .map(|(_, _, to)| to.to_string())
        .unwrap_or(vendor)
}

/// Dates agree when equal, or when the bank posting falls on a Sunday and
/// the payment on a Thursday. Payments made before the Friday/Saturday
/// weekend post on Sunday; the weekdays alone decide, not the gap.
pub fn dates_agree(bank: Option<NaiveDate>, finance: Option<NaiveDate>) -> bool {
    match (bank, finance) {
        (Some(b), Some(f)) => {
            b == f || (b.weekday() == Weekday::Sun && f.weekday() == Weekday::Thu)
        }
        _ => false,
    }
}

/// Matching view of one side's row.
#[derive(Debug, Clone)]
struct Side {
    prefix: String,
    alias: String,
    amount: Option<Decimal>,
    date: Option<NaiveDate>,
}

impl Side {
    fn new(vendor: Option<&str>, alias: String, amount: Option<f64>, date: Option<NaiveDate>) -> Self {
        let vendor = vendor.unwrap_or("").trim().to_uppercase();
        Self {
            prefix: vendor.chars().take(VENDOR_PREFIX_LEN).collect(),
            alias,
            amount: opt_money(amount).filter(|a| !a.is_zero()),
            date,
        }
    }

    fn key(&self, pass: Key) -> Option<&str> {
        let key = match pass {
            Key::Prefix => &self.prefix,
            Key::Alias => &self.alias,
        };
        (!key.is_empty()).then_some(key.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Key {
    Prefix,
    Alias,
}

/// One bank row and the finance rows it was matched to, by input index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfMatch {
    pub bank: usize,
    pub finances: Vec<usize>,
    pub match_type: String,
}

/// Result of matching one batch.
#[derive(Debug, Default)]
pub struct BfMatchSet {
    pub matches: Vec<BfMatch>,
    pub unmatched_bank: usize,
    pub unmatched_finance: usize,
}

/// Match bank rows against finance rows of the same bank.
///
/// Every row is used at most once. Groups come out in the order they were
/// found, which is the order match ids are assigned in.
pub fn match_bank_finance(
    bank_code: &str,
    banks: &[BankRecord],
    finances: &[FinanceRecord],
    max_combo: usize,
) -> BfMatchSet {
    let bank_sides: Vec<Side> = banks
        .iter()
        .map(|b| {
            let vendor = b.entry.bank_ven.as_deref();
            Side::new(
                vendor,
                vendor_alias(bank_code, vendor.unwrap_or("")),
                b.entry.withdrawal,
                b.entry.date,
            )
        })
        .collect();
    let fin_sides: Vec<Side> = finances
        .iter()
        .map(|f| {
            let vendor = f.entry.fin_ven.as_deref();
            Side::new(
                vendor,
                vendor.unwrap_or("").trim().to_uppercase(),
                f.entry.credit_amount,
                f.entry.payment_date,
            )
        })
        .collect();

    let mut fin_used = vec![false; finances.len()];
    let mut pending: Vec<usize> = (0..banks.len()).collect();
    let mut matches = Vec::new();

    for (key, alias_suffix) in [(Key::Prefix, ""), (Key::Alias, " (alias)")] {
        // 1-to-1
        pending.retain(|&b| {
            let bank = &bank_sides[b];
            let (Some(bkey), Some(amount)) = (bank.key(key), bank.amount) else {
                return true;
            };
            let found = (0..fin_sides.len()).find(|&f| {
                let fin = &fin_sides[f];
                !fin_used[f]
                    && fin.key(key) == Some(bkey)
                    && fin.amount == Some(amount)
                    && dates_agree(bank.date, fin.date)
            });
            match found {
                Some(f) => {
                    fin_used[f] = true;
                    matches.push(BfMatch {
                        bank: b,
                        finances: vec![f],
                        match_type: format!("1 to 1{alias_suffix}"),
                    });
                    false
                }
                None => true,
            }
        });

        // 1-to-N
        pending.retain(|&b| {
            let bank = &bank_sides[b];
            let (Some(bkey), Some(amount)) = (bank.key(key), bank.amount) else {
                return true;
            };
            let candidates: Vec<usize> = (0..fin_sides.len())
                .filter(|&f| {
                    let fin = &fin_sides[f];
                    !fin_used[f]
                        && fin.amount.is_some()
                        && fin.key(key) == Some(bkey)
                        && dates_agree(bank.date, fin.date)
                })
                .collect();
            let amounts: Vec<Decimal> = candidates
                .iter()
                .filter_map(|&f| fin_sides[f].amount)
                .collect();

            match find_combination(&amounts, amount, max_combo, COMBINATION_BUDGET) {
                Some(picked) => {
                    let group: Vec<usize> = picked.iter().map(|&i| candidates[i]).collect();
                    for &f in &group {
                        fin_used[f] = true;
                    }
                    matches.push(BfMatch {
                        bank: b,
                        match_type: format!("1 to {}{alias_suffix}", group.len()),
                        finances: group,
                    });
                    false
                }
                None => true,
            }
        });
    }

    BfMatchSet {
        unmatched_bank: pending.len(),
        unmatched_finance: fin_used.iter().filter(|used| !**used).count(),
        matches,
    }
}

/// First combination of 2..=`max_size` amounts summing exactly to `target`.
///
/// Smaller groups are tried first, each size in lexicographic index order.
/// Gives up after `budget` combinations.
pub fn find_combination(
    amounts: &[Decimal],
    target: Decimal,
    max_size: usize,
    budget: usize,
) -> Option<Vec<usize>> {
    let n = amounts.len();
    let mut examined = 0usize;

    for size in 2..=max_size.min(n) {
        let mut idx: Vec<usize> = (0..size).collect();
        loop {
            examined += 1;
            if examined > budget {
                tracing::debug!(budget, size, "Combination search budget exhausted");
                return None;
            }
            let sum: Decimal = idx.iter().map(|&i| amounts[i]).sum();
            if sum == target {
                return Some(idx);
            }

            // Advance to the next combination in lexicographic order.
            let Some(pos) = (0..size).rev().find(|&p| idx[p] < n - size + p) else {
                break;
            };
            idx[pos] += 1;
            for p in (pos + 1)..size {
                idx[p] = idx[p - 1] + 1;
            }
        }
    }
    None
}

/// Outcome of one bank ↔ finance run.
#[derive(Debug, Serialize)]
pub struct BankFinanceOutcome {
    /// Groups found
    pub matched_count: usize,
    pub unmatched_bank_count: usize,
    pub unmatched_finance_count: usize,
    pub run_tag: String,
    /// Rows written to `bf_matched`
    pub inserted_to_table: u64,
}

/// Runs bank ↔ finance reconciliation for one bank (and optionally one account).
pub struct BankFinanceReconciler {
    db: Db,
    locks: ReconcileLocks,
    max_combo: usize,
}

impl BankFinanceReconciler {
    pub fn new(db: Db, locks: ReconcileLocks, max_combo: usize) -> Self {
        Self {
            db,
            locks,
            max_combo,
        }
    }

    pub async fn run(&self, bank_code: &str, account: Option<&str>) -> Result<BankFinanceOutcome> {
        let _guard = self.locks.acquire(bank_code, account).await;

        let banks = self.db.bank_rows_for_bf(bank_code, account).await?;
        let finances = self.db.finance_rows_for_bf(bank_code, account).await?;

        let started = now_local();
        let tag_account = banks
            .first()
            .map(|b| b.entry.acct_no.clone())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "UnknownAcct".to_string());
        let run_tag = run_tag(bank_code, &tag_account, started);

        tracing::info!(
            bank_code,
            account,
            run_tag = %run_tag,
            bank_rows = banks.len(),
            finance_rows = finances.len(),
            "Starting bank-finance reconciliation"
        );

        let result = match_bank_finance(bank_code, &banks, &finances, self.max_combo);

        let groups: Vec<BfGroupRows<'_>> = result
            .matches
            .iter()
            .enumerate()
            .map(|(i, m)| BfGroupRows {
                match_id: match_id("BFM", &run_tag, i + 1),
                match_type: m.match_type.clone(),
                bank: &banks[m.bank],
                finances: m.finances.iter().map(|&f| &finances[f]).collect(),
            })
            .collect();

        let inserted = if groups.is_empty() {
            0
        } else {
            self.db.save_bf_groups(&groups, now_local()).await?
        };

        tracing::info!(
            run_tag = %run_tag,
            matched = groups.len(),
            inserted,
            unmatched_bank = result.unmatched_bank,
            unmatched_finance = result.unmatched_finance,
            "Bank-finance reconciliation finished"
        );

        Ok(BankFinanceOutcome {
            matched_count: groups.len(),
            unmatched_bank_count: result.unmatched_bank,
            unmatched_finance_count: result.unmatched_finance,
            run_tag,
            inserted_to_table: inserted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BankEntry, FinanceEntry};

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn bank(id: i64, vendor: &str, amount: f64, on: Option<NaiveDate>) -> BankRecord {
        BankRecord {
            bank_id: id,
            entry: BankEntry {
                bank_uid: format!("B{id}"),
                bank_code: "MDB".into(),
                acct_no: "00111050011026".into(),
                date: on,
                withdrawal: Some(amount),
                bank_ven: Some(vendor.into()),
                ..Default::default()
            },
            input_date: now_local(),
            bf_is_matched: 0,
            bf_date_matched: None,
            bft_is_matched: 0,
            bft_date_matched: None,
            bt_is_matched: 0,
            bt_date_matched: None,
        }
    }

    fn finance(id: i64, vendor: &str, amount: f64, on: Option<NaiveDate>) -> FinanceRecord {
        FinanceRecord {
            fin_id: id,
            entry: FinanceEntry {
                fin_uid: format!("F{id}"),
                credit_amount: Some(amount),
                payment_date: on,
                fin_ven: Some(vendor.into()),
                ..Default::default()
            },
            input_date: now_local(),
            bf_is_matched: 0,
            bf_date_matched: None,
            bft_is_matched: 0,
            bft_date_matched: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_dates_agree() {
        // 2025-03-09 is a Sunday, 2025-03-06 the Thursday before.
        assert!(dates_agree(date(2025, 3, 9), date(2025, 3, 9)));
        assert!(dates_agree(date(2025, 3, 9), date(2025, 3, 6)));
        // Any Thursday pairs with any Sunday, however far apart.
        assert!(dates_agree(date(2025, 3, 9), date(2025, 2, 27)));
        assert!(dates_agree(date(2025, 3, 9), date(2025, 3, 13)));
        assert!(!dates_agree(date(2025, 3, 10), date(2025, 3, 7)));
        assert!(!dates_agree(date(2025, 3, 9), date(2025, 3, 7)));
        assert!(!dates_agree(None, date(2025, 3, 9)));
    }

    #[test]
    fn test_vendor_alias() {
        assert_eq!(vendor_alias("MDB", " joynalandsons "), "JOYNALSONS");
        assert_eq!(vendor_alias("MTB", "JOYNALANDSONS"), "JOYNALANDSONS");
        assert_eq!(vendor_alias("PBL", "acme"), "ACME");
    }

    #[test]
    fn test_one_to_one_uses_prefix_and_weekend_rule() {
        let banks = vec![
            bank(1, "RAHIMTRADERS", 1500.0, date(2025, 3, 9)),
            bank(2, "KARIMSTORE", 99.99, date(2025, 3, 10)),
        ];
        let finances = vec![
            finance(10, "RAHIMTRADING", 1500.0, date(2025, 3, 6)),
            finance(11, "KARIMSTORE", 99.99, date(2025, 3, 11)),
        ];
        let result = match_bank_finance("MDB", &banks, &finances, 10);
        assert_eq!(
            result.matches,
            vec![BfMatch {
                bank: 0,
                finances: vec![0],
                match_type: "1 to 1".into()
            }]
        );
        assert_eq!(result.unmatched_bank, 1);
        assert_eq!(result.unmatched_finance, 1);
    }

    #[test]
    fn test_one_to_n_sums_exactly() {
        let on = date(2025, 3, 3);
        let banks = vec![bank(1, "ALPHACO", 300.30, on)];
        let finances = vec![
            finance(10, "ALPHACO", 100.10, on),
            finance(11, "ALPHACO", 50.00, on),
            finance(12, "ALPHACO", 200.20, on),
            finance(13, "BETALTD", 200.20, on),
        ];
        let result = match_bank_finance("MDB", &banks, &finances, 10);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].finances, vec![0, 2]);
        assert_eq!(result.matches[0].match_type, "1 to 2");
        assert_eq!(result.unmatched_finance, 2);
    }

    #[test]
    fn test_alias_passes_run_last() {
        let on = date(2025, 2, 12);
        let banks = vec![bank(1, "TALIANDCO", 500.0, on)];
        let finances = vec![finance(10, "TALICO", 500.0, on)];
        let result = match_bank_finance("MDB", &banks, &finances, 10);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].match_type, "1 to 1 (alias)");

        let banks = vec![bank(2, "BANKVENDOR", 700.0, on)];
        let finances = vec![
            finance(11, "FINVENDORALIAS", 300.0, on),
            finance(12, "FINVENDORALIAS", 400.0, on),
        ];
        let result = match_bank_finance("MTB", &banks, &finances, 10);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].match_type, "1 to 2 (alias)");
        assert_eq!(result.unmatched_finance, 0);

        // Aliases are per bank.
        let result = match_bank_finance("MDB", &banks, &finances, 10);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_each_finance_row_used_once() {
        let on = date(2025, 1, 5);
        let banks = vec![
            bank(1, "ACMEINDUSTRIES", 100.0, on),
            bank(2, "ACMEINDUSTRIES", 100.0, on),
        ];
        let finances = vec![finance(10, "ACMEI", 100.0, on)];
        let result = match_bank_finance("MTB", &banks, &finances, 10);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].bank, 0);
        assert_eq!(result.unmatched_bank, 1);
    }

    #[test]
    fn test_blank_vendor_and_zero_amount_never_match() {
        let on = date(2025, 1, 5);
        let banks = vec![bank(1, "", 10.0, on), bank(2, "ZEROCO", 0.0, on)];
        let finances = vec![finance(10, "", 10.0, on), finance(11, "ZEROCO", 0.0, on)];
        let result = match_bank_finance("MDB", &banks, &finances, 10);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_find_combination_order_and_budget() {
        let amounts = [dec("1.00"), dec("2.00"), dec("3.00"), dec("4.00")];
        assert_eq!(find_combination(&amounts, dec("5.00"), 4, 1000), Some(vec![0, 3]));
        assert_eq!(find_combination(&amounts, dec("9.00"), 4, 1000), Some(vec![1, 2, 3]));
        assert_eq!(find_combination(&amounts, dec("10.00"), 3, 1000), None);
        assert_eq!(find_combination(&amounts, dec("10.00"), 4, 1000), Some(vec![0, 1, 2, 3]));
        // C(4,2) = 6 pairs exhaust a budget of 6 before any triple is tried.
        assert_eq!(find_combination(&amounts, dec("9.00"), 4, 6), None);
        assert_eq!(find_combination(&amounts, dec("1.00"), 4, 1000), None);
    }
}
