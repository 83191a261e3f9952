// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Finance paid-list parser.

use regex::Regex;
use std::sync::LazyLock;

use super::common::{hex_date_upper, non_empty, row_tag, signed_hex};
use super::{Cell, Grid, ParseError};
use crate::models::FinanceEntry;
use crate::time_utils::month_name;

const HEADERS: [&str; 23] = [
    "Routing No",
    "Receiving A/C No",
    "Credit Amount",
    "Receiver Name",
    "Bank Name",
    "Branch Name",
    "Sender Name",
    "Sender Account",
    "Sender Bank",
    "Unit Name",
    "Team Name",
    "New Project",
    "Project",
    "Sub Project",
    "PO",
    "Status",
    "Voucher Date",
    "Voucher No",
    "Payment Date",
    "Payment Month",
    "Remarks",
    "Mark",
    "Concern",
];

/// Sender accounts whose finance spelling differs from the statement's.
const ACCOUNT_ALIASES: &[(&str, &str, &str)] = &[("MTB", "0002-0320004355", "0020320004355")];

static MS_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(M[\s./]*S[\s.]*)").unwrap());
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]{3}").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{2,4}").unwrap());

/// Parse a finance paid list. With `payment_month`, only rows whose
/// Payment Month equals it are kept.
pub fn parse(grid: &Grid, payment_month: Option<&str>) -> Result<Vec<FinanceEntry>, ParseError> {
    let header_row = grid
        .find_header_row(&HEADERS, false)
        .ok_or_else(|| ParseError::HeaderNotFound("Expected finance header row not found.".into()))?;
    let cols = grid
        .column_indices(header_row, &HEADERS, false)
        .ok_or_else(|| ParseError::HeaderNotFound("Expected finance header row not found.".into()))?;

    let rows: Vec<Vec<&Cell>> = ((header_row + 1)..grid.height())
        .map(|row| cols.iter().map(|&c| grid.get(row, c)).collect::<Vec<_>>())
        .filter(|cells| !cells.iter().all(|c| c.is_blank()))
        .filter(|cells| payment_month.is_none_or(|m| cells[19].text() == m))
        .collect();

    // The uid prefix names the sender bank of the first payment in the sheet.
    let uid_bank = rows
        .first()
        .map(|cells| cells[8].text())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let entries = rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            let text = |idx: usize| non_empty(cells[idx].text());
            let credit_amount = cells[2].as_amount();
            let payment_date = cells[18].as_date();
            let sender_bank = text(8);
            let sender_account = text(7);
            let payment_month_text = cells[19].text();
            let (statement_month, statement_year) = payment_period(&payment_month_text);

            let hex_date = payment_date
                .map(hex_date_upper)
                .unwrap_or_else(|| "UNKNOWN".into());
            let hex_amount = credit_amount
                .map(|a| signed_hex(a.trunc() as i64).to_uppercase())
                .unwrap_or_else(|| "UNKNOWN".into());

            FinanceEntry {
                fin_uid: format!("F_{uid_bank}_{hex_date}_{hex_amount}_{}", row_tag(i + 1)),
                routing_no: text(0),
                receiving_ac_no: text(1),
                credit_amount,
                receiver_name: text(3),
                bank_name: text(4),
                branch_name: text(5),
                sender_name: text(6),
                sender_account: sender_account.clone(),
                sender_bank: sender_bank.clone(),
                unit_name: text(9),
                team_name: text(10),
                new_project: text(11),
                project: text(12),
                sub_project: text(13),
                po: text(14),
                status: text(15),
                voucher_date: cells[16].as_date(),
                voucher_no: text(17),
                payment_date,
                payment_month: non_empty(payment_month_text),
                remarks: text(20),
                mark: text(21),
                concern: text(22),
                fin_ven: Some(finance_vendor(&cells[3].text())),
                acct_no: sender_account
                    .as_deref()
                    .map(|acct| statement_account(sender_bank.as_deref(), acct)),
                bank_code: sender_bank,
                statement_month,
                statement_year,
            }
        })
        .collect();

    Ok(entries)
}

/// Normalized receiver name used as the vendor key.
pub fn finance_vendor(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    MS_PREFIX_RE
        .replace(&upper, "")
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && *c != ' ')
        .collect()
}

/// Account number as it appears on the bank statement.
fn statement_account(bank: Option<&str>, account: &str) -> String {
    ACCOUNT_ALIASES
        .iter()
        .find(|(b, finance, _)| Some(*b) == bank && *finance == account)
        .map(|(_, _, statement)| statement.to_string())
        .unwrap_or_else(|| account.replace('-', ""))
}

/// Statement month/year from a Payment Month label such as `Mar-25`.
fn payment_period(label: &str) -> (Option<String>, Option<String>) {
    let month = MONTH_RE.find(label).and_then(|m| {
        let abbrev = m.as_str();
        (1..=12)
            .filter_map(month_name)
            .find(|name| name[..3].eq_ignore_ascii_case(abbrev))
            .map(str::to_string)
    });
    let year = YEAR_RE.find(label).map(|y| {
        let y = y.as_str();
        if y.len() == 2 {
            format!("20{y}")
        } else {
            y.to_string()
        }
    });
    (month, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payment_row(values: &[(&str, &str)]) -> Vec<String> {
        HEADERS
            .iter()
            .map(|h| {
                values
                    .iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn paid_list() -> Grid {
        Grid::from_strings(vec![
            vec!["Paid list".to_string()],
            HEADERS.iter().map(|h| h.to_string()).collect(),
            payment_row(&[
                ("Credit Amount", "1500.75"),
                ("Receiver Name", "M/S. Joynal & Sons"),
                ("Sender Account", "0002-0320004355"),
                ("Sender Bank", "MTB"),
                ("Voucher No", "PV-0012"),
                ("Payment Date", "2025-03-02"),
                ("Payment Month", "Mar-25"),
            ]),
            payment_row(&[]),
            payment_row(&[
                ("Credit Amount", "200"),
                ("Receiver Name", "Tali and Co."),
                ("Sender Account", "0011-1050011026"),
                ("Sender Bank", "MDB"),
                ("Payment Month", "April 2025"),
            ]),
        ])
    }

    #[test]
    fn test_parse_paid_list() {
        let entries = parse(&paid_list(), None).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(
            first.fin_uid,
            format!("F_MTB_{:X}_{:X}_000001", 20250302, 1500)
        );
        assert_eq!(first.credit_amount, Some(1500.75));
        assert_eq!(first.fin_ven.as_deref(), Some("JOYNALSONS"));
        assert_eq!(first.bank_code.as_deref(), Some("MTB"));
        assert_eq!(first.acct_no.as_deref(), Some("0020320004355"));
        assert_eq!(first.payment_date, NaiveDate::from_ymd_opt(2025, 3, 2));
        assert_eq!(first.statement_month.as_deref(), Some("March"));
        assert_eq!(first.statement_year.as_deref(), Some("2025"));
        assert_eq!(first.voucher_no.as_deref(), Some("PV-0012"));

        // The uid prefix stays on the first row's bank.
        let second = &entries[1];
        assert_eq!(
            second.fin_uid,
            format!("F_MTB_UNKNOWN_{:X}_000002", 200)
        );
        assert_eq!(second.acct_no.as_deref(), Some("00111050011026"));
        assert_eq!(second.fin_ven.as_deref(), Some("TALIANDCO"));
        assert_eq!(second.statement_month.as_deref(), Some("April"));
        assert_eq!(second.statement_year.as_deref(), Some("2025"));
    }

    #[test]
    fn test_payment_month_filter() {
        let entries = parse(&paid_list(), Some("April 2025")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].bank_code.as_deref(), Some("MDB"));
        assert!(entries[0].fin_uid.starts_with("F_MDB_"));
    }

    #[test]
    fn test_missing_header() {
        let grid = Grid::from_strings([["Routing No", "Credit Amount"]]);
        let err = parse(&grid, None).unwrap_err();
        assert_eq!(err.to_string(), "Expected finance header row not found.");
    }

    #[test]
    fn test_finance_vendor() {
        assert_eq!(finance_vendor(" m/s  Rahim Store "), "RAHIMSTORE");
        assert_eq!(finance_vendor("ABC (Pvt.) Ltd."), "ABCPVTLTD");
        assert_eq!(finance_vendor(""), "");
    }
}
