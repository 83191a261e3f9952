// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scoped reconciliation reports.
//!
//! Every report is a fixed column list over one bank account and statement
//! period. Rows are numbered with a leading `S/N` column.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::ReportScope;

/// Serial number column prepended to every report.
pub const SERIAL_COLUMN: &str = "S/N";

/// The reports served under `/reports/{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    UnmatchedBank,
    UnmatchedTally,
    BankFinanceMatched,
    BankFinanceTallyMatched,
    BankTallyMatched,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        Self::UnmatchedBank,
        Self::UnmatchedTally,
        Self::BankFinanceMatched,
        Self::BankFinanceTallyMatched,
        Self::BankTallyMatched,
    ];

    /// Parse the route segment, e.g. `bank_fin_matched`.
    pub fn from_route(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.route() == segment)
    }

    pub fn route(self) -> &'static str {
        match self {
            Self::UnmatchedBank => "unmatched_bank",
            Self::UnmatchedTally => "unmatched_tally",
            Self::BankFinanceMatched => "bank_fin_matched",
            Self::BankFinanceTallyMatched => "bank_fin_tally_matched",
            Self::BankTallyMatched => "bank_tally_matched",
        }
    }

    /// Download name of the Excel export.
    pub fn file_name(self) -> String {
        format!("{}_report.xlsx", self.route())
    }

    /// Report columns, in output order, starting with `S/N`.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::UnmatchedBank => &[
                SERIAL_COLUMN,
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
                "bank_ven",
            ],
            Self::UnmatchedTally => &[
                SERIAL_COLUMN,
                "tally_uid",
                "bank_code",
                "acct_no",
                "statement_month",
                "statement_year",
                "unit_name",
                "T_Date",
                "dr_cr",
                "T_Particulars",
                "T_Vch_Type",
                "T_Vch_No",
                "T_Debit",
                "T_Credit",
                "tally_ven",
            ],
            Self::BankFinanceMatched => &[
                SERIAL_COLUMN,
                "bf_match_id",
                "bf_source",
                "bf_match_type",
                "bank_uid",
                "bank_code",
                "acct_no",
                "B_Date",
                "B_Particulars",
                "B_Ref_Cheque",
                "B_Withdrawal",
                "B_Deposit",
                "bank_ven",
                "statement_month",
                "statement_year",
                "fin_uid",
                "F_Credit_Amount",
                "F_Receiver_Name",
                "F_Voucher_No",
                "fin_ven",
            ],
            Self::BankFinanceTallyMatched => &[
                SERIAL_COLUMN,
                "bft_match_id",
                "bft_source",
                "bft_match_type",
                "bank_uid",
                "bank_code",
                "acct_no",
                "B_Date",
                "B_Particulars",
                "B_Ref_Cheque",
                "B_Withdrawal",
                "B_Deposit",
                "bank_ven",
                "fin_uid",
                "F_Credit_Amount",
                "F_Receiver_Name",
                "F_Voucher_No",
                "fin_ven",
                "tally_uid",
                "T_Date",
                "dr_cr",
                "T_Particulars",
                "T_Vch_No",
                "T_Debit",
                "T_Credit",
                "tally_ven",
                "statement_month",
                "statement_year",
            ],
            Self::BankTallyMatched => &[
                SERIAL_COLUMN,
                "bt_match_id",
                "bt_source",
                "bank_uid",
                "acct_no",
                "bank_code",
                "B_Date",
                "B_Particulars",
                "B_Ref_Cheque",
                "B_Withdrawal",
                "B_Deposit",
                "bank_ven",
                "tally_uid",
                "T_Date",
                "dr_cr",
                "T_Particulars",
                "T_Vch_No",
                "T_Debit",
                "T_Credit",
                "tally_ven",
                "statement_month",
                "statement_year",
            ],
        }
    }

    /// Load the report rows for `scope`, projected onto [`Self::columns`].
    pub async fn load(self, db: &Db, scope: &ReportScope) -> Result<Vec<Map<String, Value>>> {
        let rows = match self {
            Self::UnmatchedBank => to_values(db.unmatched_bank_report(scope).await?),
            Self::UnmatchedTally => to_values(db.unmatched_tally_report(scope).await?),
            Self::BankFinanceMatched => to_values(db.bf_matched_report(scope).await?),
            Self::BankFinanceTallyMatched => to_values(db.bft_matched_report(scope).await?),
            Self::BankTallyMatched => to_values(db.bt_matched_report(scope).await?),
        }?;
        Ok(project(&rows, self.columns()))
    }
}

fn to_values<T: Serialize>(rows: Vec<T>) -> Result<Vec<Value>> {
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(|e| AppError::Internal(e.into())))
        .collect()
}

/// Keep only `columns` of each row, in order, numbering rows from 1 in the
/// `S/N` column. Columns a row lacks are rendered as an empty string.
pub fn project(rows: &[Value], columns: &[&str]) -> Vec<Map<String, Value>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            columns
                .iter()
                .map(|&col| {
                    let value = if col == SERIAL_COLUMN {
                        Value::from(i + 1)
                    } else {
                        row.get(col).cloned().unwrap_or_else(|| Value::from(""))
                    };
                    (col.to_string(), value)
                })
                .collect()
        })
        .collect()
}
