// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Midland Bank (MDB) statement parser.
//!
//! Layout: account number at (2, 11), `Statement Period: dd-Mon-yyyy To
//! dd-Mon-yyyy` at (6, 0), then a header row with Date / Particular /
//! Withdrawal / Deposit / Balance.

use regex::Regex;
use std::sync::LazyLock;

use super::common::{hex_amount, hex_date, non_empty, period_labels, row_tag};
use super::{Grid, ParseError};
use crate::models::BankEntry;

pub const BANK_CODE: &str = "MDB";

/// Accounts accepted for Midland Bank uploads.
pub const ALLOWED_ACCOUNTS: &[&str] = &["0011-1050011026", "0011-1060000331"];

const HEADERS: [&str; 5] = ["Date", "Particular", "Withdrawal", "Deposit", "Balance"];

static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9-]+").unwrap());
static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Statement Period:\s*([\dA-Za-z-]+)\s*To\s*([\dA-Za-z-]+)").unwrap()
});
static CLG_INWARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^CLG- InwardCA\d{7} RV").unwrap());
static ONLINE_CASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^on-line cashca(\d{7})").unwrap());
static MS_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^M[\s./\\-]*S[\s./\\-]*").unwrap());

/// Parse an MDB statement sheet into bank entries.
pub fn parse(grid: &Grid) -> Result<Vec<BankEntry>, ParseError> {
    let header_row = grid.find_header_row(&HEADERS, true).ok_or_else(|| {
        ParseError::HeaderNotFound("Header row with expected columns not found.".into())
    })?;

    let account = account_number(grid, header_row);
    if !ALLOWED_ACCOUNTS.contains(&account.as_str()) {
        return Err(ParseError::AccountNotAllowed(format!(
            "Account {account} is not listed for Midland Bank. \
             Please make sure you're uploading the correct statement."
        )));
    }
    let (statement_month, statement_year) = statement_period(grid, header_row)?;

    let cols = grid
        .column_indices(header_row, &HEADERS, true)
        .ok_or_else(|| ParseError::HeaderNotFound("Header columns not found.".into()))?;
    let acct_no = account.replace('-', "");

    let mut entries = Vec::new();
    for row in (header_row + 1)..grid.height() {
        let cells: Vec<_> = cols.iter().map(|&c| grid.get(row, c)).collect();
        if cells.iter().all(|c| c.is_blank()) {
            continue;
        }
        let texts: Vec<String> = cells.iter().map(|c| c.text()).collect();

        let repeats_header = HEADERS
            .iter()
            .zip(&texts)
            .any(|(h, t)| t.eq_ignore_ascii_case(h));
        if repeats_header {
            continue;
        }
        let particular = &texts[1];
        let lower = particular.to_lowercase();
        if lower == "balance b/f" || lower.contains("total") {
            continue;
        }

        let date = cells[0].as_date();
        let balance = cells[4].as_amount();
        let bank_uid = format!(
            "B_{BANK_CODE}_{}_{}_{}",
            hex_date(date),
            hex_amount(balance).unwrap_or_else(|| "0".into()),
            row_tag(entries.len() + 1)
        );

        entries.push(BankEntry {
            bank_uid,
            bank_code: BANK_CODE.to_string(),
            acct_no: acct_no.clone(),
            statement_month: statement_month.clone(),
            statement_year: statement_year.clone(),
            date,
            particulars: non_empty(particular.clone()),
            ref_cheque: None,
            withdrawal: cells[2].as_amount(),
            deposit: cells[3].as_amount(),
            balance,
            bank_ven: Some(bank_vendor(particular)),
        });
    }

    Ok(entries)
}

fn account_number(grid: &Grid, header_row: usize) -> String {
    if header_row <= 2 {
        return "UnknownAcc".into();
    }
    let raw = grid.text(2, 11).replace(':', "");
    let raw = raw.trim();
    let account = ACCOUNT_RE
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string());
    if account.is_empty() {
        "UnknownAcc".into()
    } else {
        account
    }
}

fn statement_period(
    grid: &Grid,
    header_row: usize,
) -> Result<(Option<String>, Option<String>), ParseError> {
    if header_row <= 6 {
        return Err(ParseError::Metadata(
            "Could not access metadata cell [6, 0] for statement period.".into(),
        ));
    }
    let cell = grid.text(6, 0);
    if !cell.starts_with("Statement Period:") {
        return Err(ParseError::Metadata(
            "Statement period cell missing or misformatted in [6, 0].".into(),
        ));
    }
    let caps = PERIOD_RE.captures(&cell).ok_or_else(|| {
        ParseError::Metadata("Could not parse dates in statement period cell.".into())
    })?;
    let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%d-%b-%Y");
    match (parse(&caps[1]), parse(&caps[2])) {
        (Ok(first), Ok(last)) => Ok(period_labels(first, last)),
        _ => Err(ParseError::Metadata(
            "Date format error in statement period cell.".into(),
        )),
    }
}

/// Text between the first slash and the `end_from_right`-th slash counted from the end.
fn between_slashes(text: &str, end_from_right: usize) -> &str {
    let slashes: Vec<usize> = text.match_indices('/').map(|(i, _)| i).collect();
    if slashes.len() < end_from_right + 1 {
        return "";
    }
    let start = slashes[0] + 1;
    let end = slashes[slashes.len() - end_from_right];
    text[start..end].trim()
}

fn normalize_vendor(name: &str) -> String {
    let stripped = MS_PREFIX_RE.replace(name.trim(), "");
    stripped
        .chars()
        .filter(|c| !matches!(c, '.' | ' ' | '-'))
        .collect::<String>()
        .to_uppercase()
}

/// Counterparty name carried in an MDB narration.
pub fn bank_vendor(particular: &str) -> String {
    let p = particular.trim();
    let lower = p.to_ascii_lowercase();

    if lower.starts_with("rtgs rtgs outward") || lower.starts_with("charge rtgs charge") {
        return normalize_vendor(between_slashes(p, 6));
    }
    if lower.starts_with("rtgs rtgs inward") {
        return normalize_vendor(between_slashes(p, 5));
    }
    if lower.starts_with("clg hv") {
        return normalize_vendor(between_slashes(p, 4));
    }

    let slashes: Vec<usize> = p.match_indices('/').map(|(i, _)| i).collect();
    if lower.starts_with("transfer beftn outward") && slashes.len() >= 4 {
        return normalize_vendor(p[slashes[2] + 1..slashes[3]].trim());
    }

    if CLG_INWARD_RE.is_match(p) {
        if let Some(idx) = lower.find("pay to :") {
            let after = p[idx + "pay to :".len()..].trim();
            let vendor = after.split('/').next().unwrap_or("").trim();
            return normalize_vendor(vendor);
        }
    }

    if lower.starts_with("on-line cashca") {
        let Some(m) = ONLINE_CASH_RE.captures(p).and_then(|c| c.get(0)) else {
            return String::new();
        };
        let rest = &p[m.end()..];
        let mut portion = match rest.find('/') {
            Some(slash) => rest[..slash].trim(),
            None => rest.trim(),
        };
        for phrase in ["Number of Tran. exceeded TP.", "No. of Tran. exceeded TP."] {
            portion = portion.split(phrase).next().unwrap_or("").trim();
        }
        return normalize_vendor(portion);
    }
    if lower.starts_with("on-line cash") {
        return normalize_vendor(p["On-Line Cash".len()..].trim());
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn statement(rows: &[[&str; 5]]) -> Grid {
        let mut grid: Vec<Vec<String>> = vec![vec![String::new(); 12]; 8];
        grid[0][0] = "Midland Bank PLC".into();
        grid[2][11] = "A/C No : 0011-1050011026".into();
        grid[6][0] = "Statement Period: 01-Feb-2025 To 28-Feb-2025".into();
        let mut header = vec![String::new(); 12];
        for (i, h) in HEADERS.iter().enumerate() {
            header[i] = h.to_string();
        }
        grid.push(header);
        for r in rows {
            let mut row = vec![String::new(); 12];
            for (i, v) in r.iter().enumerate() {
                row[i] = v.to_string();
            }
            grid.push(row);
        }
        Grid::from_strings(grid)
    }

    #[test]
    fn test_parse_statement_rows() {
        let grid = statement(&[
            ["", "Balance B/F", "", "", "1,000.00"],
            [
                "03-Feb-2025",
                "RTGS RTGS Outward/Joynal and Sons/a/b/c/d/e/f",
                "500.00",
                "",
                "500.00",
            ],
            ["", "Particular", "Withdrawal", "", ""],
            ["04-Feb-2025", "On-Line Cash Deposit", "", "250.56", "750.56"],
            ["", "Total", "500.00", "250.56", ""],
            ["", "", "", "", ""],
        ]);

        let entries = parse(&grid).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.acct_no, "00111050011026");
        assert_eq!(first.bank_code, "MDB");
        assert_eq!(first.statement_month.as_deref(), Some("February"));
        assert_eq!(first.statement_year.as_deref(), Some("2025"));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(first.withdrawal, Some(500.0));
        assert_eq!(first.deposit, None);
        assert_eq!(first.bank_ven.as_deref(), Some("JOYNALANDSONS"));
        assert_eq!(
            first.bank_uid,
            format!("B_MDB_{:x}_{:x}_000001", 20250203, 500)
        );

        let second = &entries[1];
        assert_eq!(second.deposit, Some(250.56));
        assert_eq!(second.bank_ven.as_deref(), Some("DEPOSIT"));
        assert!(second.bank_uid.ends_with("_000002"));
    }

    #[test]
    fn test_rejects_unknown_account() {
        let mut grid: Vec<Vec<String>> = vec![vec![String::new(); 12]; 9];
        grid[2][11] = "A/C No : 9999-0000000000".into();
        grid[6][0] = "Statement Period: 01-Feb-2025 To 28-Feb-2025".into();
        for (i, h) in HEADERS.iter().enumerate() {
            grid[8][i] = h.to_string();
        }
        let err = parse(&Grid::from_strings(grid)).unwrap_err();
        assert!(matches!(err, ParseError::AccountNotAllowed(_)));
        assert!(err.to_string().contains("9999-0000000000"));
    }

    #[test]
    fn test_missing_header() {
        let grid = Grid::from_strings([["Date", "Particular"]]);
        assert!(matches!(parse(&grid), Err(ParseError::HeaderNotFound(_))));
    }

    #[test]
    fn test_bank_vendor_rules() {
        assert_eq!(
            bank_vendor("RTGS RTGS INWARD/M.S. Tali & Co/a/b/c/d/e"),
            "TALI&CO"
        );
        assert_eq!(
            bank_vendor("Transfer BEFTN Outward/123/456/ABC Traders/789"),
            "ABCTRADERS"
        );
        assert_eq!(
            bank_vendor("CLG- InwardCA1234567 RV Pay To : Rahim Store/xyz"),
            "RAHIMSTORE"
        );
        assert_eq!(
            bank_vendor("On-Line CashCA1234567 Karim Enterprise No. of Tran. exceeded TP./9"),
            "KARIMENTERPRISE"
        );
        assert_eq!(bank_vendor("On-Line CashCA12 short"), "");
        assert_eq!(bank_vendor("Cheque withdrawal"), "");
    }
}
