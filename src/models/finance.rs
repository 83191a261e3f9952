// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Finance paid-list models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One parsed finance payment line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct FinanceEntry {
    pub fin_uid: String,
    #[serde(rename = "F_Routing_No")]
    #[sqlx(rename = "F_Routing_No")]
    pub routing_no: Option<String>,
    #[serde(rename = "F_Receiving_AC_No")]
    #[sqlx(rename = "F_Receiving_AC_No")]
    pub receiving_ac_no: Option<String>,
    #[serde(rename = "F_Credit_Amount")]
    #[sqlx(rename = "F_Credit_Amount")]
    pub credit_amount: Option<f64>,
    #[serde(rename = "F_Receiver_Name")]
    #[sqlx(rename = "F_Receiver_Name")]
    pub receiver_name: Option<String>,
    #[serde(rename = "F_Bank_Name")]
    #[sqlx(rename = "F_Bank_Name")]
    pub bank_name: Option<String>,
    #[serde(rename = "F_Branch_Name")]
    #[sqlx(rename = "F_Branch_Name")]
    pub branch_name: Option<String>,
    #[serde(rename = "F_Sender_Name")]
    #[sqlx(rename = "F_Sender_Name")]
    pub sender_name: Option<String>,
    #[serde(rename = "F_Sender_Account")]
    #[sqlx(rename = "F_Sender_Account")]
    pub sender_account: Option<String>,
    #[serde(rename = "F_Sender_Bank")]
    #[sqlx(rename = "F_Sender_Bank")]
    pub sender_bank: Option<String>,
    #[serde(rename = "F_Unit_Name")]
    #[sqlx(rename = "F_Unit_Name")]
    pub unit_name: Option<String>,
    #[serde(rename = "F_Team_Name")]
    #[sqlx(rename = "F_Team_Name")]
    pub team_name: Option<String>,
    #[serde(rename = "F_New_Project")]
    #[sqlx(rename = "F_New_Project")]
    pub new_project: Option<String>,
    #[serde(rename = "F_Project")]
    #[sqlx(rename = "F_Project")]
    pub project: Option<String>,
    #[serde(rename = "F_Sub_Project")]
    #[sqlx(rename = "F_Sub_Project")]
    pub sub_project: Option<String>,
    #[serde(rename = "F_PO")]
    #[sqlx(rename = "F_PO")]
    pub po: Option<String>,
    #[serde(rename = "F_Status")]
    #[sqlx(rename = "F_Status")]
    pub status: Option<String>,
    #[serde(rename = "F_Voucher_Date")]
    #[sqlx(rename = "F_Voucher_Date")]
    pub voucher_date: Option<NaiveDate>,
    #[serde(rename = "F_Voucher_No")]
    #[sqlx(rename = "F_Voucher_No")]
    pub voucher_no: Option<String>,
    #[serde(rename = "F_Payment_Date")]
    #[sqlx(rename = "F_Payment_Date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(rename = "F_Payment_Month")]
    #[sqlx(rename = "F_Payment_Month")]
    pub payment_month: Option<String>,
    #[serde(rename = "F_Remarks")]
    #[sqlx(rename = "F_Remarks")]
    pub remarks: Option<String>,
    #[serde(rename = "F_Mark")]
    #[sqlx(rename = "F_Mark")]
    pub mark: Option<String>,
    #[serde(rename = "F_Concern")]
    #[sqlx(rename = "F_Concern")]
    pub concern: Option<String>,
    /// Normalized receiver name
    pub fin_ven: Option<String>,
    /// Sender bank, used to pair with bank statements
    pub bank_code: Option<String>,
    /// Sender account without dashes
    pub acct_no: Option<String>,
    pub statement_month: Option<String>,
    pub statement_year: Option<String>,
}

/// Stored `fin_data` row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FinanceRecord {
    pub fin_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub entry: FinanceEntry,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize")]
    pub input_date: NaiveDateTime,
    pub bf_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bf_date_matched: Option<NaiveDateTime>,
    pub bft_is_matched: i64,
    #[serde(serialize_with = "crate::time_utils::date_only::serialize_opt")]
    pub bft_date_matched: Option<NaiveDateTime>,
}

impl FinanceRecord {
    /// Column names of `fin_data`, in table order.
    pub const COLUMNS: &'static [&'static str] = &[
        "fin_id",
        "fin_uid",
        "F_Routing_No",
        "F_Receiving_AC_No",
        "F_Credit_Amount",
        "F_Receiver_Name",
        "F_Bank_Name",
        "F_Branch_Name",
        "F_Sender_Name",
        "F_Sender_Account",
        "F_Sender_Bank",
        "F_Unit_Name",
        "F_Team_Name",
        "F_New_Project",
        "F_Project",
        "F_Sub_Project",
        "F_PO",
        "F_Status",
        "F_Voucher_Date",
        "F_Voucher_No",
        "F_Payment_Date",
        "F_Payment_Month",
        "F_Remarks",
        "F_Mark",
        "F_Concern",
        "fin_ven",
        "bank_code",
        "acct_no",
        "statement_month",
        "statement_year",
        "input_date",
        "bf_is_matched",
        "bf_date_matched",
        "bft_is_matched",
        "bft_date_matched",
    ];
}
