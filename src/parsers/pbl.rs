// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prime Bank (PBL) statement parser.
//!
//! The PBL export has a fixed layout: six metadata rows and the column
//! header on row 5.

use regex::Regex;
use std::sync::LazyLock;

use super::common::{hex_amount, hex_date, non_empty, row_tag};
use super::{Grid, ParseError};
use crate::models::BankEntry;
use crate::time_utils::month_name;
use chrono::Datelike;

pub const BANK_CODE: &str = "PBL";

pub const ALLOWED_ACCOUNTS: &[&str] = &["2126117010855"];

const HEADER_ROW: usize = 5;
const HEADERS: [&str; 6] = [
    "Tran Date",
    "Transaction Ref.",
    "Description",
    "Debit",
    "Credit",
    "Balance",
];

static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9-]+").unwrap());
static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)FROM\s+(.+?)\s+TO\s+(.+)").unwrap());

pub fn parse(grid: &Grid) -> Result<Vec<BankEntry>, ParseError> {
    let account = ACCOUNT_RE
        .find(&grid.text(2, 3))
        .map(|m| m.as_str().replace('-', ""))
        .unwrap_or_else(|| "UnknownAcc".to_string());
    if !ALLOWED_ACCOUNTS.contains(&account.as_str()) {
        return Err(ParseError::AccountNotAllowed(format!(
            "Account {account} is not authorized for PBL statements."
        )));
    }

    // Month and year follow the period start; an unreadable period leaves both blank.
    let start = PERIOD_RE
        .captures(&grid.text(4, 0))
        .and_then(|caps| chrono::NaiveDate::parse_from_str(caps[1].trim(), "%d %b %Y").ok());
    let statement_month = start.and_then(|d| month_name(d.month()).map(str::to_string));
    let statement_year = start.map(|d| d.year().to_string());

    let cols = grid
        .column_indices(HEADER_ROW, &HEADERS, false)
        .ok_or_else(|| ParseError::HeaderNotFound("Expected PBL header row not found.".into()))?;

    let mut entries = Vec::new();
    for row in (HEADER_ROW + 1)..grid.height() {
        let cells: Vec<_> = cols.iter().map(|&c| grid.get(row, c)).collect();
        let texts: Vec<String> = cells.iter().map(|c| c.text()).collect();

        if texts[0].starts_with("BALANCE AT PERIOD START :") {
            continue;
        }
        let repeats_header = HEADERS
            .iter()
            .zip(&texts)
            .all(|(h, t)| t.eq_ignore_ascii_case(h));
        if repeats_header || cells.iter().all(|c| c.is_blank()) {
            continue;
        }
        if texts[2].eq_ignore_ascii_case("balance b/f") {
            continue;
        }

        let date = cells[0].as_date();
        let balance = cells[5].as_amount();
        entries.push(BankEntry {
            bank_uid: format!(
                "{BANK_CODE}_{}_{}_{}",
                hex_date(date),
                hex_amount(balance).unwrap_or_else(|| "0".into()),
                row_tag(entries.len() + 1)
            ),
            bank_code: BANK_CODE.to_string(),
            acct_no: account.clone(),
            statement_month: statement_month.clone(),
            statement_year: statement_year.clone(),
            date,
            particulars: non_empty(texts[2].clone()),
            ref_cheque: non_empty(texts[1].clone()),
            withdrawal: cells[3].as_amount(),
            deposit: cells[4].as_amount(),
            balance,
            bank_ven: Some(String::new()),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn statement(account: &str, rows: &[[&str; 6]]) -> Grid {
        let mut grid: Vec<Vec<String>> = vec![vec![String::new(); 6]; 5];
        grid[0][0] = "Prime Bank PLC".into();
        grid[2][3] = format!("A/C: {account}");
        grid[4][0] = "Statement FROM 01 Apr 2025 TO 30 Apr 2025".into();
        grid.push(HEADERS.iter().map(|h| h.to_string()).collect());
        for r in rows {
            grid.push(r.iter().map(|v| v.to_string()).collect());
        }
        Grid::from_strings(grid)
    }

    #[test]
    fn test_parse_statement() {
        let grid = statement(
            "2126-1170-10855",
            &[
                ["BALANCE AT PERIOD START : 10,000.00", "", "", "", "", ""],
                ["", "", "Balance B/F", "", "", "10,000.00"],
                [
                    "2025-04-03",
                    "PCHQ00123456",
                    "Cheque paid",
                    "2,500.00",
                    "",
                    "7,500.00",
                ],
                HEADERS,
                ["", "", "", "", "", ""],
                ["2025-04-09", "", "Deposit", "", "1,000", "8,500.00"],
            ],
        );

        let entries = parse(&grid).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.acct_no, "2126117010855");
        assert_eq!(first.statement_month.as_deref(), Some("April"));
        assert_eq!(first.statement_year.as_deref(), Some("2025"));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 4, 3));
        assert_eq!(first.ref_cheque.as_deref(), Some("PCHQ00123456"));
        assert_eq!(first.withdrawal, Some(2500.0));
        assert_eq!(first.bank_ven.as_deref(), Some(""));
        assert_eq!(
            first.bank_uid,
            format!("PBL_{:x}_{:x}_000001", 20250403, 7500)
        );
        assert_eq!(entries[1].deposit, Some(1000.0));
        assert_eq!(entries[1].ref_cheque, None);
    }

    #[test]
    fn test_unparseable_period_leaves_labels_blank() {
        let mut grid: Vec<Vec<String>> = vec![vec![String::new(); 6]; 5];
        grid[2][3] = "2126117010855".into();
        grid[4][0] = "Statement".into();
        grid.push(HEADERS.iter().map(|h| h.to_string()).collect());
        grid.push(
            ["2025-04-03", "", "x", "1", "", "1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let entries = parse(&Grid::from_strings(grid)).unwrap();
        assert_eq!(entries[0].statement_month, None);
        assert_eq!(entries[0].statement_year, None);
    }

    #[test]
    fn test_rejects_unknown_account() {
        let err = parse(&statement("1111111111", &[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Account 1111111111 is not authorized for PBL statements."
        );
    }
}
