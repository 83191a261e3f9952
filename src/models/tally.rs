// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tally ledger models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One parsed Tally ledger voucher line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct TallyEntry {
    pub tally_uid: String,
    pub bank_code: String,
    pub acct_no: String,
    /// Business unit named in the ledger heading
    pub unit_name: Option<String>,
    pub statement_month: Option<String>,
    pub statement_year: Option<String>,
    #[serde(rename = "T_Date")]
    #[sqlx(rename = "T_Date")]
    pub date: Option<NaiveDate>,
    /// `To` / `By` marker from the ledger's first Particulars column
    pub dr_cr: Option<String>,
    /// Particulars, normalized to `header\ndetails`
    #[serde(rename = "T_Particulars")]
    #[sqlx(rename = "T_Particulars")]
    pub particulars: Option<String>,
    #[serde(rename = "T_Vch_Type")]
    #[sqlx(rename = "T_Vch_Type")]
    pub vch_type: Option<String>,
    #[serde(rename = "T_Vch_No")]
    #[sqlx(rename = "T_Vch_No")]
    pub vch_no: Option<String>,
    #[serde(rename = "T_Debit")]
    #[sqlx(rename = "T_Debit")]
    pub debit: Option<f64>,
    #[serde(rename = "T_Credit")]
    #[sqlx(rename = "T_Credit")]
    pub credit: Option<f64>,
    pub tally_ven: Option<String>,
}

/// Stored `tally_data` row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TallyRecord {
    pub tally_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub entry: TallyEntry,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub input_date: NaiveDateTime,
    pub bft_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bft_date_matched: Option<NaiveDateTime>,
    pub bt_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bt_date_matched: Option<NaiveDateTime>,
}

impl TallyRecord {
    /// Column names of `tally_data`, in table order.
    pub const COLUMNS: &'static [&'static str] = &[
        "tally_id",
        "tally_uid",
        "bank_code",
        "acct_no",
        "unit_name",
        "statement_month",
        "statement_year",
        "T_Date",
        "dr_cr",
        "T_Particulars",
        "T_Vch_Type",
        "T_Vch_No",
        "T_Debit",
        "T_Credit",
        "tally_ven",
        "input_date",
        "bft_is_matched",
        "bft_date_matched",
        "bt_is_matched",
        "bt_date_matched",
    ];
}
