// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bank statement models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One parsed bank statement line, as produced by a bank parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct BankEntry {
    /// Deterministic unique id (`B_MDB_<hexdate>_<hexbal>_<row>` etc.)
    pub bank_uid: String,
    /// Bank code (MDB, MTB, PBL)
    pub bank_code: String,
    /// Account number without dashes
    pub acct_no: String,
    pub statement_month: Option<String>,
    pub statement_year: Option<String>,
    #[serde(rename = "B_Date")]
    #[sqlx(rename = "B_Date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "B_Particulars")]
    #[sqlx(rename = "B_Particulars")]
    pub particulars: Option<String>,
    #[serde(rename = "B_Ref_Cheque")]
    #[sqlx(rename = "B_Ref_Cheque")]
    pub ref_cheque: Option<String>,
    #[serde(rename = "B_Withdrawal")]
    #[sqlx(rename = "B_Withdrawal")]
    pub withdrawal: Option<f64>,
    #[serde(rename = "B_Deposit")]
    #[sqlx(rename = "B_Deposit")]
    pub deposit: Option<f64>,
    #[serde(rename = "B_Balance")]
    #[sqlx(rename = "B_Balance")]
    pub balance: Option<f64>,
    /// Normalized counterparty name derived from the narration
    pub bank_ven: Option<String>,
}

/// Stored `bank_data` row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BankRecord {
    pub bank_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub entry: BankEntry,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub input_date: NaiveDateTime,
    pub bf_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bf_date_matched: Option<NaiveDateTime>,
    pub bft_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bft_date_matched: Option<NaiveDateTime>,
    pub bt_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bt_date_matched: Option<NaiveDateTime>,
}

impl BankRecord {
    /// Column names of `bank_data`, in table order.
    pub const COLUMNS: &'static [&'static str] = &[
        "bank_id",
        "bank_uid",
        "bank_code",
        "acct_no",
        "statement_month",
        "statement_year",
        "B_Date",
        "B_Particulars",
        "B_Ref_Cheque",
        "B_Withdrawal",
        "B_Deposit",
        "B_Balance",
        "bank_ven",
        "input_date",
        "bf_is_matched",
        "bf_date_matched",
        "bft_is_matched",
        "bft_date_matched",
        "bt_is_matched",
        "bt_date_matched",
    ];
}
