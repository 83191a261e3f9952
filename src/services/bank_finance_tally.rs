// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bank ↔ finance ↔ Tally reconciliation.
//!
//! Confirms existing bank-finance groups against the Tally ledger: every
//! finance payment of a group must have its own Tally voucher with the same
//! voucher number and amount.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{match_id, run_tag, ReconcileLocks};
use crate::db::{BftGroupRows, Db};
use crate::error::{AppError, Result};
use crate::models::{BfMatchedRow, MatchSource, TallyRecord};
use crate::money::{money_or_zero, opt_money};
use crate::time_utils::now_local;

/// Digits of a voucher number, e.g. `PV-0012` → `0012`.
pub fn voucher_digits(value: Option<&str>) -> String {
    value
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// A bank-finance group as loaded from `bf_matched`.
#[derive(Debug)]
pub struct BfGroup<'a> {
    pub bf_match_id: &'a str,
    pub banks: Vec<&'a BfMatchedRow>,
    pub finances: Vec<&'a BfMatchedRow>,
}

/// Split `bf_matched` rows (ordered by group) into groups.
pub fn group_rows(rows: &[BfMatchedRow]) -> Vec<BfGroup<'_>> {
    let mut groups: Vec<BfGroup<'_>> = Vec::new();
    for row in rows {
        let group = match groups.last_mut() {
            Some(g) if g.bf_match_id == row.bf_match_id => g,
            _ => {
                groups.push(BfGroup {
                    bf_match_id: &row.bf_match_id,
                    banks: Vec::new(),
                    finances: Vec::new(),
                });
                groups.last_mut().expect("group was just pushed")
            }
        };
        match row.source() {
            Some(MatchSource::Bank) => group.banks.push(row),
            Some(MatchSource::Finance) => group.finances.push(row),
            _ => {}
        }
    }
    groups
}

/// A confirmed group: group index plus the Tally rows (by index) that
/// cover its finance rows, in finance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BftMatch {
    pub group: usize,
    pub tallies: Vec<usize>,
}

/// Confirm groups against Tally rows. A Tally row confirms at most one
/// finance payment per run.
pub fn match_groups(groups: &[BfGroup<'_>], tallies: &[TallyRecord]) -> Vec<BftMatch> {
    let keys: Vec<(String, Option<Decimal>)> = tallies
        .iter()
        .map(|t| (voucher_digits(t.entry.vch_no.as_deref()), opt_money(t.entry.credit)))
        .collect();
    let mut used = vec![false; tallies.len()];
    let mut matches = Vec::new();

    for (g, group) in groups.iter().enumerate() {
        let [bank] = group.banks.as_slice() else {
            continue;
        };
        if group.finances.is_empty() {
            continue;
        }
        let Some(bank_amount) = opt_money(bank.b_withdrawal) else {
            continue;
        };

        let mut picked: Vec<usize> = Vec::with_capacity(group.finances.len());
        for fin in &group.finances {
            let vch = voucher_digits(fin.f_voucher_no.as_deref());
            let amount = opt_money(fin.f_credit_amount);
            let found = (0..tallies.len()).find(|&t| {
                !used[t] && !picked.contains(&t) && keys[t].0 == vch && amount.is_some() && keys[t].1 == amount
            });
            match found {
                Some(t) => picked.push(t),
                None => break,
            }
        }
        if picked.len() != group.finances.len() {
            continue;
        }

        let fin_sum: Decimal = group.finances.iter().map(|f| money_or_zero(f.f_credit_amount)).sum();
        let tally_sum: Decimal = picked.iter().map(|&t| money_or_zero(tallies[t].entry.credit)).sum();
        if fin_sum == bank_amount && tally_sum == bank_amount {
            for &t in &picked {
                used[t] = true;
            }
            matches.push(BftMatch {
                group: g,
                tallies: picked,
            });
        }
    }
    matches
}

/// Outcome of one bank ↔ finance ↔ Tally run.
#[derive(Debug, Serialize)]
pub struct BankFinanceTallyOutcome {
    pub success: bool,
    /// Rows written to `bft_matched`
    pub inserted: u64,
    pub msg: String,
    /// Groups confirmed
    pub matched_count: usize,
    pub unmatched_bf_count: usize,
    pub unmatched_tally_count: usize,
}

/// Runs bank ↔ finance ↔ Tally reconciliation for one account.
pub struct BankFinanceTallyReconciler {
    db: Db,
    locks: ReconcileLocks,
}

impl BankFinanceTallyReconciler {
    pub fn new(db: Db, locks: ReconcileLocks) -> Self {
        Self { db, locks }
    }

    pub async fn run(&self, bank_code: &str, account: &str) -> Result<BankFinanceTallyOutcome> {
        let _guard = self.locks.acquire(bank_code, Some(account)).await;

        let rows = self.db.bf_groups_for_bft(bank_code, account).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(
                "No groups found for this bank/account.".to_string(),
            ));
        }
        let tallies = self.db.tally_rows_for_bft(bank_code, account).await?;
        let groups = group_rows(&rows);
        let bank_rows: usize = groups.iter().map(|g| g.banks.len()).sum();

        if tallies.is_empty() {
            return Ok(BankFinanceTallyOutcome {
                success: false,
                inserted: 0,
                msg: "No unmatched bf_matched or tally_data found for this bank/account.".to_string(),
                matched_count: 0,
                unmatched_bf_count: bank_rows,
                unmatched_tally_count: 0,
            });
        }

        let run_tag = run_tag(bank_code, account, now_local());
        tracing::info!(
            bank_code,
            account,
            run_tag = %run_tag,
            groups = groups.len(),
            tally_rows = tallies.len(),
            "Starting bank-finance-tally reconciliation"
        );

        let matches = match_groups(&groups, &tallies);
        let confirmed: Vec<BftGroupRows<'_>> = matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let group = &groups[m.group];
                BftGroupRows {
                    match_id: match_id("BFTM", &run_tag, i + 1),
                    match_type: format!("1 to {} to {}", group.finances.len(), m.tallies.len()),
                    bf_match_id: group.bf_match_id.to_string(),
                    bank: group.banks[0],
                    finances: group.finances.clone(),
                    tallies: m.tallies.iter().map(|&t| &tallies[t]).collect(),
                }
            })
            .collect();

        let inserted = if confirmed.is_empty() {
            0
        } else {
            self.db.save_bft_groups(&confirmed, now_local()).await?
        };
        let matched_tally: usize = confirmed.iter().map(|g| g.tallies.len()).sum();

        tracing::info!(
            run_tag = %run_tag,
            matched = confirmed.len(),
            inserted,
            "Bank-finance-tally reconciliation finished"
        );

        Ok(BankFinanceTallyOutcome {
            success: true,
            inserted,
            msg: format!("{inserted} records reconciled and saved to bft_matched."),
            matched_count: confirmed.len(),
            unmatched_bf_count: bank_rows - confirmed.len(),
            unmatched_tally_count: tallies.len() - matched_tally,
        })
    }
}
