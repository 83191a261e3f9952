// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bank ↔ Tally cheque reconciliation.
//!
//! Both sides carry a cheque or transfer reference somewhere in their text.
//! Each bank has its own extraction rules; a bank row and a Tally voucher
//! pair up when their references are equal and the amounts agree in
//! direction (bank withdrawal = Tally credit, bank deposit = Tally debit).

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::{match_id, run_tag, ReconcileLocks};
use crate::db::{BtPairRows, Db};
use crate::error::{AppError, Result};
use crate::models::{BankRecord, TallyRecord};
use crate::money::opt_money;
use crate::time_utils::now_local;

/// Shortest reference accepted by the prefix rules.
const MIN_REF_LEN: usize = 5;

const MDB_BANK_PREFIXES: &[&str] = &["on-line cashca", "clg- inwardca"];

/// Narration openings whose reference is the n-th non-blank `/` segment.
const MDB_BANK_SEGMENTS: &[(&str, usize)] = &[
    ("RTGS RTGS Outward", 2),
    ("RTGS RTGS INWARD", 2),
    ("CLG HV", 3),
];

const MDB_TALLY_PREFIXES: &[&str] = &[
    "cq-",
    "Cheque No : C ",
    "A/C-",
    "CD-",
    "STD-",
    "OD#",
    "CQ-",
    "(Hypo)-",
    "SND-",
];

const MTB_BANK_PREFIXES: &[&str] = &["LC ISSUE CHARGE :"];

const MTB_TALLY_PREFIXES: &[&str] = &[
    "$", "cq-", "A/C-", "CD-", "STD-", "OD#", "CQ-", "(Hypo)-", "GULC#",
];

fn prefix_patterns(prefixes: &[&str]) -> Vec<Regex> {
    prefixes
        .iter()
        .map(|p| {
            Regex::new(&format!(
                r"(?i){}([\d\- ]{{{MIN_REF_LEN},}})",
                regex::escape(p)
            ))
            .unwrap()
        })
        .collect()
}

static MDB_BANK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| prefix_patterns(MDB_BANK_PREFIXES));
static MDB_TALLY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| prefix_patterns(MDB_TALLY_PREFIXES));
static MTB_BANK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| prefix_patterns(MTB_BANK_PREFIXES));
static MTB_TALLY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| prefix_patterns(MTB_TALLY_PREFIXES));
static MTB_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"[\d,]{{{MIN_REF_LEN},}}")).unwrap());
static PBL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,}[0-9]{6,}[A-Z0-9]*)\b").unwrap());

/// Remove every character in `chars` from `text`.
fn strip_chars(text: &str, chars: &[char]) -> String {
    text.chars().filter(|c| !chars.contains(c)).collect()
}

/// First prefix rule that matches, with dashes and whitespace removed.
fn first_prefixed(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text).map(|caps| {
            caps[1]
                .chars()
                .filter(|c| *c != '-' && !c.is_whitespace())
                .collect()
        })
    })
}

/// Non-blank `/` segments of a narration.
fn segments(text: &str) -> Vec<&str> {
    text.split('/').filter(|s| !s.trim().is_empty()).collect()
}

/// Cheque reference in an MDB statement narration.
pub fn mdb_bank_ref(text: &str) -> Option<String> {
    if let Some(found) = first_prefixed(text, &MDB_BANK_RES) {
        return Some(found);
    }
    let lower = text.to_lowercase();
    MDB_BANK_SEGMENTS.iter().find_map(|(opening, n)| {
        if !lower.starts_with(&opening.to_lowercase()) {
            return None;
        }
        let value = segments(text)
            .get(*n)
            .map(|seg| strip_chars(seg, &[',', '-']).split_whitespace().collect::<String>())?;
        (value.chars().count() >= MIN_REF_LEN).then_some(value)
    })
}

/// Cheque reference in an MDB Tally narration.
pub fn mdb_tally_ref(text: &str) -> Option<String> {
    first_prefixed(text, &MDB_TALLY_RES)
}

/// The `nth` (1-based) long number in `text`, without separators.
fn nth_number(text: &str, nth: usize) -> Option<String> {
    MTB_NUMBER_RE
        .find_iter(text)
        .nth(nth - 1)
        .map(|m| strip_chars(m.as_str(), &[',']))
        .filter(|s| !s.is_empty())
}

/// Cheque reference in an MTB statement narration, leading zeros removed.
pub fn mtb_bank_ref(text: &str) -> Option<String> {
    first_prefixed(text, &MTB_BANK_RES)
        .or_else(|| nth_number(text, 2))
        .or_else(|| nth_number(text, 1))
        .or_else(|| segments(text).get(3).and_then(|seg| nth_number(seg, 1)))
        .map(|r| r.trim_start_matches('0').to_string())
        .filter(|r| !r.is_empty())
}

/// Cheque reference in an MTB Tally narration, leading zeros removed.
pub fn mtb_tally_ref(text: &str) -> Option<String> {
    first_prefixed(text, &MTB_TALLY_RES)
        .map(|r| r.trim_start_matches('0').to_string())
        .filter(|r| !r.is_empty())
}

/// Transaction code such as `LD2503320442` or `FT250321KBLVY`.
pub fn pbl_ref(text: &str) -> Option<String> {
    PBL_CODE_RE.captures(text).map(|caps| caps[1].to_string())
}

/// Banks with cheque-reference rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChequeRules {
    Mdb,
    Mtb,
    Pbl,
}

impl ChequeRules {
    pub fn for_bank(bank_code: &str) -> Option<Self> {
        match bank_code {
            "MDB" => Some(Self::Mdb),
            "MTB" => Some(Self::Mtb),
            "PBL" => Some(Self::Pbl),
            _ => None,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            Self::Pbl => "PTM",
            Self::Mdb | Self::Mtb => "BTM",
        }
    }

    pub fn bank_ref(self, bank: &BankRecord) -> Option<String> {
        match self {
            Self::Mdb => bank.entry.particulars.as_deref().and_then(mdb_bank_ref),
            Self::Mtb => bank.entry.particulars.as_deref().and_then(mtb_bank_ref),
            Self::Pbl => bank.entry.ref_cheque.as_deref().and_then(pbl_ref),
        }
    }

    pub fn tally_ref(self, tally: &TallyRecord) -> Option<String> {
        let text = tally.entry.particulars.as_deref()?;
        match self {
            Self::Mdb => mdb_tally_ref(text),
            Self::Mtb => mtb_tally_ref(text),
            Self::Pbl => pbl_ref(text),
        }
    }

    /// Withdrawal against Tally credit, or deposit against Tally debit.
    /// Zero amounts never count.
    fn amounts_agree(self, bank: &BankRecord, tally: &TallyRecord) -> bool {
        let nonzero = |v: Option<f64>| opt_money(v).filter(|d| !d.is_zero());
        let withdrawal = match self {
            Self::Pbl => nonzero(bank.entry.withdrawal).map(|d| d.abs()),
            Self::Mdb | Self::Mtb => nonzero(bank.entry.withdrawal),
        };
        let deposit = nonzero(bank.entry.deposit);

        (withdrawal.is_some() && withdrawal == opt_money(tally.entry.credit))
            || (deposit.is_some() && deposit == opt_money(tally.entry.debit))
    }
}

/// One bank row paired with one Tally row, by input index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtPair {
    pub bank: usize,
    pub tally: usize,
    pub cheque_ref: String,
}

/// Pair bank rows with Tally rows on reference and amount.
///
/// Bank rows are visited in order; each takes the first unused Tally row
/// with the same reference whose amount agrees.
pub fn match_bank_tally(rules: ChequeRules, banks: &[BankRecord], tallies: &[TallyRecord]) -> Vec<BtPair> {
    let mut by_ref: HashMap<String, Vec<usize>> = HashMap::new();
    for (t, tally) in tallies.iter().enumerate() {
        if let Some(r) = rules.tally_ref(tally) {
            by_ref.entry(r).or_default().push(t);
        }
    }

    let mut used = vec![false; tallies.len()];
    let mut pairs = Vec::new();
    for (b, bank) in banks.iter().enumerate() {
        let Some(r) = rules.bank_ref(bank) else {
            continue;
        };
        let Some(candidates) = by_ref.get(&r) else {
            continue;
        };
        if let Some(&t) = candidates
            .iter()
            .find(|&&t| !used[t] && rules.amounts_agree(bank, &tallies[t]))
        {
            used[t] = true;
            pairs.push(BtPair {
                bank: b,
                tally: t,
                cheque_ref: r,
            });
        }
    }
    pairs
}

/// Outcome of one bank ↔ Tally run.
#[derive(Debug, Serialize)]
pub struct BankTallyOutcome {
    /// Pairs found
    pub matched_count: usize,
    pub msg: String,
}

/// Runs bank ↔ Tally cheque reconciliation for one account.
pub struct BankTallyReconciler {
    db: Db,
    locks: ReconcileLocks,
}

impl BankTallyReconciler {
    pub fn new(db: Db, locks: ReconcileLocks) -> Self {
        Self { db, locks }
    }

    pub async fn run(&self, bank_code: &str, account: &str) -> Result<BankTallyOutcome> {
        let rules = ChequeRules::for_bank(bank_code).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Bank code {bank_code} not supported for cheque reconciliation."
            ))
        })?;

        let _guard = self.locks.acquire(bank_code, Some(account)).await;

        let banks = self.db.bank_rows_for_bt(bank_code, account).await?;
        let tallies = self.db.tally_rows_for_bt(bank_code, account).await?;
        if banks.is_empty() || tallies.is_empty() {
            return Err(AppError::NotFound(
                "No unmatched data for this bank/account.".to_string(),
            ));
        }

        let run_tag = run_tag(bank_code, account, now_local());
        tracing::info!(
            bank_code,
            account,
            run_tag = %run_tag,
            bank_rows = banks.len(),
            tally_rows = tallies.len(),
            "Starting bank-tally reconciliation"
        );

        let pairs = match_bank_tally(rules, &banks, &tallies);
        let rows: Vec<BtPairRows<'_>> = pairs
            .iter()
            .enumerate()
            .map(|(i, p)| BtPairRows {
                match_id: match_id(rules.id_prefix(), &run_tag, i + 1),
                cheque_ref: p.cheque_ref.clone(),
                bank: &banks[p.bank],
                tally: &tallies[p.tally],
            })
            .collect();

        let inserted = if rows.is_empty() {
            0
        } else {
            self.db.save_bt_pairs(&rows, now_local()).await?
        };

        tracing::info!(run_tag = %run_tag, pairs = rows.len(), inserted, "Bank-tally reconciliation finished");

        Ok(BankTallyOutcome {
            matched_count: rows.len(),
            msg: format!("Matched records inserted: {inserted}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BankEntry, TallyEntry};

    fn bank(particulars: &str, ref_cheque: &str, withdrawal: f64, deposit: f64) -> BankRecord {
        BankRecord {
            bank_id: 1,
            entry: BankEntry {
                particulars: Some(particulars.into()),
                ref_cheque: Some(ref_cheque.into()),
                withdrawal: Some(withdrawal),
                deposit: Some(deposit),
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

    fn tally(particulars: &str, debit: f64, credit: f64) -> TallyRecord {
        TallyRecord {
            tally_id: 1,
            entry: TallyEntry {
                particulars: Some(particulars.into()),
                debit: Some(debit),
                credit: Some(credit),
                ..Default::default()
            },
            input_date: now_local(),
            bft_is_matched: 0,
            bft_date_matched: None,
            bt_is_matched: 0,
            bt_date_matched: None,
        }
    }

    #[test]
    fn test_mdb_bank_ref() {
        assert_eq!(
            mdb_bank_ref("ON-LINE CASHCA 1234-567 Gulshan").as_deref(),
            Some("1234567")
        );
        assert_eq!(mdb_bank_ref("CLG- INWARDCA 0098765").as_deref(), Some("0098765"));
        assert_eq!(
            mdb_bank_ref("RTGS RTGS Outward/Joynal/REF 12-345/x").as_deref(),
            Some("REF12345")
        );
        assert_eq!(
            mdb_bank_ref("CLG HV/a/b/7654,321/c").as_deref(),
            Some("7654321")
        );
        assert_eq!(mdb_bank_ref("RTGS RTGS INWARD/a/12/x"), None);
        assert_eq!(mdb_bank_ref("Cash deposit"), None);
    }

    #[test]
    fn test_mdb_tally_ref() {
        assert_eq!(mdb_tally_ref("Payment\ncq- 123 456").as_deref(), Some("123456"));
        assert_eq!(
            mdb_tally_ref("Cheque No : C 0045678").as_deref(),
            Some("0045678")
        );
        assert_eq!(mdb_tally_ref("(hypo)-99887").as_deref(), Some("99887"));
        assert_eq!(mdb_tally_ref("cq-12"), None);
    }

    #[test]
    fn test_mtb_refs() {
        assert_eq!(
            mtb_bank_ref("LC ISSUE CHARGE : 000123456").as_deref(),
            Some("123456")
        );
        assert_eq!(
            mtb_bank_ref("Transfer 11111 to 0022,333").as_deref(),
            Some("22333")
        );
        assert_eq!(mtb_bank_ref("Cheque 0076543").as_deref(), Some("76543"));
        assert_eq!(mtb_bank_ref("no numbers here"), None);
        assert_eq!(mtb_tally_ref("Paid $ 0076543").as_deref(), Some("76543"));
        assert_eq!(mtb_tally_ref("GULC#12345").as_deref(), Some("12345"));
    }

    #[test]
    fn test_pbl_ref() {
        assert_eq!(pbl_ref("LD2503320442").as_deref(), Some("LD2503320442"));
        assert_eq!(
            pbl_ref("Transfer\nFT250321KBLVY ref").as_deref(),
            Some("FT250321KBLVY")
        );
        assert_eq!(pbl_ref("ld2503320442"), None);
        assert_eq!(pbl_ref("AB12345"), None);
    }

    #[test]
    fn test_pairs_follow_direction_and_use_tally_once() {
        let banks = vec![
            bank("CLG- INWARDCA 55555", "", 1000.0, 0.0),
            bank("CLG- INWARDCA 55555", "", 1000.0, 0.0),
            bank("ON-LINE CASHCA 77777", "", 0.0, 250.0),
            bank("ON-LINE CASHCA 88888", "", 0.0, 0.0),
        ];
        let tallies = vec![
            tally("cq-55555", 1000.0, 0.0),
            tally("cq-55555", 0.0, 1000.0),
            tally("CD-77777", 250.0, 0.0),
            tally("CD-88888", 0.0, 0.0),
        ];
        let pairs = match_bank_tally(ChequeRules::Mdb, &banks, &tallies);
        assert_eq!(
            pairs,
            vec![
                BtPair {
                    bank: 0,
                    tally: 1,
                    cheque_ref: "55555".into()
                },
                BtPair {
                    bank: 2,
                    tally: 2,
                    cheque_ref: "77777".into()
                },
            ]
        );
    }

    #[test]
    fn test_pbl_compares_absolute_withdrawal() {
        let banks = vec![bank("", "PDLD2404274823", -500.0, 0.0)];
        let tallies = vec![tally("Loan\nPDLD2404274823", 0.0, 500.0)];
        assert_eq!(match_bank_tally(ChequeRules::Pbl, &banks, &tallies).len(), 1);
        assert!(match_bank_tally(ChequeRules::Mtb, &banks, &tallies).is_empty());
    }

    #[test]
    fn test_unsupported_bank() {
        assert_eq!(ChequeRules::for_bank("EBL"), None);
        assert_eq!(ChequeRules::for_bank("PBL"), Some(ChequeRules::Pbl));
    }
}
