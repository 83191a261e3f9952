// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciliation result rows (`bf_matched`, `bft_matched`, `bt_matched`).
//!
//! Each match table stores one row per participating source record. Rows of
//! one group share a match id and carry the columns of their own source; the
//! columns of the other sources stay NULL.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// Which ledger a match row was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Bank,
    Finance,
    Tally,
}

impl MatchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchSource::Bank => "Bank",
            MatchSource::Finance => "Finance",
            MatchSource::Tally => "Tally",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored `bf_matched` row (bank ↔ finance).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BfMatchedRow {
    pub bf_id: i64,
    pub bf_match_id: String,
    pub bf_source: String,
    pub bf_match_type: String,
    pub bank_code: String,
    pub acct_no: Option<String>,
    pub statement_month: Option<String>,
    pub statement_year: Option<String>,
    pub bank_id: Option<i64>,
    pub bank_uid: Option<String>,
    #[serde(rename = "B_Date")]
    #[sqlx(rename = "B_Date")]
    pub b_date: Option<NaiveDate>,
    #[serde(rename = "B_Particulars")]
    #[sqlx(rename = "B_Particulars")]
    pub b_particulars: Option<String>,
    #[serde(rename = "B_Ref_Cheque")]
    #[sqlx(rename = "B_Ref_Cheque")]
    pub b_ref_cheque: Option<String>,
    #[serde(rename = "B_Withdrawal")]
    #[sqlx(rename = "B_Withdrawal")]
    pub b_withdrawal: Option<f64>,
    #[serde(rename = "B_Deposit")]
    #[sqlx(rename = "B_Deposit")]
    pub b_deposit: Option<f64>,
    #[serde(rename = "B_Balance")]
    #[sqlx(rename = "B_Balance")]
    pub b_balance: Option<f64>,
    pub bank_ven: Option<String>,
    pub fin_id: Option<i64>,
    pub fin_uid: Option<String>,
    #[serde(rename = "F_Credit_Amount")]
    #[sqlx(rename = "F_Credit_Amount")]
    pub f_credit_amount: Option<f64>,
    #[serde(rename = "F_Receiver_Name")]
    #[sqlx(rename = "F_Receiver_Name")]
    pub f_receiver_name: Option<String>,
    #[serde(rename = "F_Sender_Account")]
    #[sqlx(rename = "F_Sender_Account")]
    pub f_sender_account: Option<String>,
    #[serde(rename = "F_Voucher_No")]
    #[sqlx(rename = "F_Voucher_No")]
    pub f_voucher_no: Option<String>,
    #[serde(rename = "F_Payment_Date")]
    #[sqlx(rename = "F_Payment_Date")]
    pub f_payment_date: Option<NaiveDate>,
    pub fin_ven: Option<String>,
    pub bf_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub bf_date_matched: NaiveDateTime,
    pub bft_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bft_date_matched: Option<NaiveDateTime>,
}

impl BfMatchedRow {
    pub fn source(&self) -> Option<MatchSource> {
        match self.bf_source.to_ascii_lowercase().as_str() {
            "bank" => Some(MatchSource::Bank),
            "finance" => Some(MatchSource::Finance),
            _ => None,
        }
    }
}

/// Stored `bft_matched` row (bank ↔ finance ↔ tally).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BftMatchedRow {
    pub bft_id: i64,
    pub bft_match_id: String,
    pub bft_source: String,
    pub bft_match_type: String,
    pub bf_match_id: Option<String>,
    pub bank_code: String,
    pub acct_no: Option<String>,
    pub statement_month: Option<String>,
    pub statement_year: Option<String>,
    pub bank_uid: Option<String>,
    #[serde(rename = "B_Date")]
    #[sqlx(rename = "B_Date")]
    pub b_date: Option<NaiveDate>,
    #[serde(rename = "B_Particulars")]
    #[sqlx(rename = "B_Particulars")]
    pub b_particulars: Option<String>,
    #[serde(rename = "B_Ref_Cheque")]
    #[sqlx(rename = "B_Ref_Cheque")]
    pub b_ref_cheque: Option<String>,
    #[serde(rename = "B_Withdrawal")]
    #[sqlx(rename = "B_Withdrawal")]
    pub b_withdrawal: Option<f64>,
    #[serde(rename = "B_Deposit")]
    #[sqlx(rename = "B_Deposit")]
    pub b_deposit: Option<f64>,
    pub bank_ven: Option<String>,
    pub fin_uid: Option<String>,
    #[serde(rename = "F_Credit_Amount")]
    #[sqlx(rename = "F_Credit_Amount")]
    pub f_credit_amount: Option<f64>,
    #[serde(rename = "F_Receiver_Name")]
    #[sqlx(rename = "F_Receiver_Name")]
    pub f_receiver_name: Option<String>,
    #[serde(rename = "F_Voucher_No")]
    #[sqlx(rename = "F_Voucher_No")]
    pub f_voucher_no: Option<String>,
    pub fin_ven: Option<String>,
    pub tally_uid: Option<String>,
    pub unit_name: Option<String>,
    #[serde(rename = "T_Date")]
    #[sqlx(rename = "T_Date")]
    pub t_date: Option<NaiveDate>,
    pub dr_cr: Option<String>,
    #[serde(rename = "T_Particulars")]
    #[sqlx(rename = "T_Particulars")]
    pub t_particulars: Option<String>,
    #[serde(rename = "T_Vch_Type")]
    #[sqlx(rename = "T_Vch_Type")]
    pub t_vch_type: Option<String>,
    #[serde(rename = "T_Vch_No")]
    #[sqlx(rename = "T_Vch_No")]
    pub t_vch_no: Option<String>,
    #[serde(rename = "T_Debit")]
    #[sqlx(rename = "T_Debit")]
    pub t_debit: Option<f64>,
    #[serde(rename = "T_Credit")]
    #[sqlx(rename = "T_Credit")]
    pub t_credit: Option<f64>,
    pub tally_ven: Option<String>,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub input_date: NaiveDateTime,
    pub bft_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub bft_date_matched: NaiveDateTime,
}

/// Stored `bt_matched` row (bank ↔ tally).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BtMatchedRow {
    pub bt_id: i64,
    pub bt_match_id: String,
    pub bt_source: String,
    pub bank_code: String,
    pub acct_no: Option<String>,
    pub statement_month: Option<String>,
    pub statement_year: Option<String>,
    pub bank_uid: Option<String>,
    #[serde(rename = "B_Date")]
    #[sqlx(rename = "B_Date")]
    pub b_date: Option<NaiveDate>,
    #[serde(rename = "B_Particulars")]
    #[sqlx(rename = "B_Particulars")]
    pub b_particulars: Option<String>,
    #[serde(rename = "B_Ref_Cheque")]
    #[sqlx(rename = "B_Ref_Cheque")]
    pub b_ref_cheque: Option<String>,
    #[serde(rename = "B_Withdrawal")]
    #[sqlx(rename = "B_Withdrawal")]
    pub b_withdrawal: Option<f64>,
    #[serde(rename = "B_Deposit")]
    #[sqlx(rename = "B_Deposit")]
    pub b_deposit: Option<f64>,
    pub bank_ven: Option<String>,
    pub tally_uid: Option<String>,
    pub unit_name: Option<String>,
    #[serde(rename = "T_Date")]
    #[sqlx(rename = "T_Date")]
    pub t_date: Option<NaiveDate>,
    pub dr_cr: Option<String>,
    #[serde(rename = "T_Particulars")]
    #[sqlx(rename = "T_Particulars")]
    pub t_particulars: Option<String>,
    #[serde(rename = "T_Vch_Type")]
    #[sqlx(rename = "T_Vch_Type")]
    pub t_vch_type: Option<String>,
    #[serde(rename = "T_Vch_No")]
    #[sqlx(rename = "T_Vch_No")]
    pub t_vch_no: Option<String>,
    #[serde(rename = "T_Debit")]
    #[sqlx(rename = "T_Debit")]
    pub t_debit: Option<f64>,
    #[serde(rename = "T_Credit")]
    #[sqlx(rename = "T_Credit")]
    pub t_credit: Option<f64>,
    pub tally_ven: Option<String>,
    /// Cheque/transfer reference both sides were paired on
    pub cheque_ref: Option<String>,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub input_date: NaiveDateTime,
    pub bt_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub bt_date_matched: NaiveDateTime,
}
