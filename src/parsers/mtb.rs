// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mutual Trust Bank (MTB) statement parser.

use regex::Regex;
use std::sync::LazyLock;

use super::common::{hex_amount, hex_date, non_empty, period_labels, row_tag};
use super::{Grid, ParseError};
use crate::models::BankEntry;

pub const BANK_CODE: &str = "MTB";

/// Worksheet that holds the statement in MTB exports.
pub const SHEET_NAME: &str = "AcStatementReport";

pub const ALLOWED_ACCOUNTS: &[&str] = &["0020320004355"];

const HEADERS: [&str; 7] = [
    "Date",
    "Transaction Detail",
    "Ref/Cheque No",
    "Withdrawal (Dr.)",
    "Deposit (Cr.)",
    "Balance",
    "Branch",
];

/// Fixed metadata cells, in absolute sheet coordinates.
const ACCOUNT_CELL: (usize, usize) = (18, 5);
const PERIOD_CELL: (usize, usize) = (30, 5);

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}-\d{2}-\d{4})\s*To\s*(\d{2}-\d{2}-\d{4})").unwrap());
static MS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bM[.\s/\\]*S\b").unwrap());

pub fn parse(grid: &Grid) -> Result<Vec<BankEntry>, ParseError> {
    let header_row = grid
        .find_header_row(&HEADERS, false)
        .ok_or_else(|| ParseError::HeaderNotFound("Required headers not found.".into()))?;

    let account = metadata_text(grid, header_row, ACCOUNT_CELL)
        .map(|s| s.trim_start_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "UnknownAcc".to_string());
    if !ALLOWED_ACCOUNTS.contains(&account.as_str()) {
        return Err(ParseError::AccountNotAllowed(format!(
            "Account number {account} not allowed for Mutual Trust Bank. \
             Please check your upload or select the correct bank."
        )));
    }
    let (statement_month, statement_year) = statement_period(grid, header_row)?;

    let cols = grid
        .column_indices(header_row, &HEADERS, false)
        .ok_or_else(|| ParseError::HeaderNotFound("Required headers not found.".into()))?;

    let mut entries = Vec::new();
    for row in (header_row + 1)..grid.height() {
        let cells: Vec<_> = cols.iter().map(|&c| grid.get(row, c)).collect();
        if cells.iter().all(|c| c.is_blank()) {
            continue;
        }
        let detail = cells[1].text();
        let date = cells[0].as_date_with_format("%d-%m-%Y");
        let balance = cells[5].as_amount();

        entries.push(BankEntry {
            bank_uid: format!(
                "B_{BANK_CODE}_{}_{}_{}",
                hex_date(date),
                hex_amount(balance).unwrap_or_else(|| "0".into()),
                row_tag(entries.len() + 1)
            ),
            bank_code: BANK_CODE.to_string(),
            acct_no: account.clone(),
            statement_month: statement_month.clone(),
            statement_year: statement_year.clone(),
            date,
            particulars: non_empty(detail.clone()),
            ref_cheque: non_empty(cells[2].text()),
            withdrawal: cells[3].as_amount(),
            deposit: cells[4].as_amount(),
            balance,
            bank_ven: Some(bank_vendor(&detail)),
        });
    }

    Ok(entries)
}

/// Text of a metadata cell, which must sit above the header row.
fn metadata_text(grid: &Grid, header_row: usize, (row, col): (usize, usize)) -> Option<String> {
    (row < header_row).then(|| grid.text(row, col))
}

fn statement_period(
    grid: &Grid,
    header_row: usize,
) -> Result<(Option<String>, Option<String>), ParseError> {
    let (row, col) = PERIOD_CELL;
    let cell = metadata_text(grid, header_row, PERIOD_CELL).ok_or_else(|| {
        ParseError::Metadata(format!(
            "Could not access metadata cell [{row}, {col}] for statement period."
        ))
    })?;
    if !cell.contains("To") {
        return Err(ParseError::Metadata(format!(
            "Statement period cell missing or misformatted in [{row}, {col}]."
        )));
    }
    let caps = PERIOD_RE.captures(&cell).ok_or_else(|| {
        ParseError::Metadata("Could not parse dates in statement period cell.".into())
    })?;
    let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%d-%m-%Y");
    match (parse(&caps[1]), parse(&caps[2])) {
        (Ok(first), Ok(last)) => Ok(period_labels(first, last)),
        _ => Err(ParseError::Metadata(
            "Date format error in statement period cell.".into(),
        )),
    }
}

/// Counterparty name from an MTB transaction detail.
pub fn bank_vendor(detail: &str) -> String {
    let text = detail.split_whitespace().collect::<Vec<_>>().join(" ");

    let vendor = if text.starts_with("RTGS/MTB") {
        let parts: Vec<&str> = text.split('/').collect();
        if parts.len() >= 3 {
            parts[2..parts.len() - 1].join(" ")
        } else {
            String::new()
        }
    } else if text.starts_with("EFT OCE") {
        text.split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .nth(3)
            .unwrap_or("")
            .to_string()
    } else {
        String::new()
    };

    MS_RE
        .replace_all(vendor.trim(), "")
        .chars()
        .filter(|c| !matches!(c, '.' | ' '))
        .collect::<String>()
        .to_uppercase()
}
