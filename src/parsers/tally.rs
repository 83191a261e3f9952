// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tally bank-ledger parser.
//!
//! A Tally ledger export starts with free-text heading rows (company, unit,
//! bank account, period) in the first column, followed by a voucher table.
//! The `Particulars` header spans two columns: the `To`/`By` marker and the
//! ledger name. Narration lines continue on following rows with no date.

use regex::Regex;
use std::sync::LazyLock;

use super::common::{hex_amount, hex_date, non_empty, period_labels, row_tag};
use super::{Cell, Grid, ParseError};
use crate::models::TallyEntry;

const HEADERS: [&str; 6] = ["Date", "Particulars", "Vch Type", "Vch No.", "Debit", "Credit"];

/// Bank name spellings found in ledger headings, checked in order.
const BANK_PATTERNS: &[(&str, &[&str])] = &[
    ("MTB", &["Mutual Trust Bank", "MTB"]),
    ("MDB", &["Midland Bank", "Midland", "MDB"]),
    ("PBL", &["Prime Bank", "PBL"]),
    ("OBL", &["One Bank", "OBL"]),
    ("EBL", &["Eastern Bank", "EBL"]),
];

static ACCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{8,}|\d{3,}-\d{7,}|\d{4,}-\d{7,})").unwrap());
static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}-[A-Za-z]{3}-\d{4})\s*to\s*(\d{1,2}-[A-Za-z]{3}-\d{4})").unwrap()
});
static UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Unit\s*:?[\s)]*([^)]+)").unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9\-/ ]+)[.:,-]\s*(.+)").unwrap());

static CE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z]+-CE-\d+-\d+-CI)\b").unwrap());
static PAYABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Payable-([^-]+)-ID").unwrap());
static COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([A-Za-z .&-]+(?:Ltd|Limited))").unwrap());
static ADVANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(adv(?:ance)?|ap)[\s-]*").unwrap());
static MS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(m[\s\-/]*s)[\s-]*").unwrap());
static ID_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)-ID:").unwrap());
static AND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\band\b").unwrap());
static PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[[:punct:]\s]+").unwrap());

/// Ledger heading details found above the voucher table.
#[derive(Debug, Default, PartialEq)]
struct Heading {
    bank_code: String,
    acct_no: String,
    unit_name: Option<String>,
    statement_month: Option<String>,
    statement_year: Option<String>,
}

/// Positions of the voucher columns once `Particulars` has been split.
struct Columns {
    date: usize,
    dr_cr: usize,
    particulars: usize,
    vch_type: Option<usize>,
    vch_no: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
}

pub fn parse(grid: &Grid) -> Result<Vec<TallyEntry>, ParseError> {
    let header_row = grid
        .find_header_row(&HEADERS, false)
        .ok_or_else(|| ParseError::HeaderNotFound("Header row not found.".into()))?;
    let heading = read_heading(grid, header_row)?;
    let cols = voucher_columns(grid.row(header_row))
        .ok_or_else(|| ParseError::HeaderNotFound("Header row not found.".into()))?;
    let width = grid.row(header_row).len();

    let mut rows = collapse_narrations(grid, header_row, &cols, width);
    if rows.last().is_some_and(|row| is_totals_row(row)) {
        rows.pop();
    }

    let mut entries = Vec::new();
    for row in rows {
        let particulars = format_particulars(&row[cols.particulars].text());
        let lower = particulars.trim().to_lowercase();
        if lower == "opening balance" || lower.starts_with("closing balance") {
            continue;
        }
        // Undated lines are carried-over totals, not vouchers.
        let Some(date) = row[cols.date].as_date() else {
            continue;
        };

        let amount_at = |idx: Option<usize>| idx.and_then(|i| row[i].as_amount());
        let text_at = |idx: Option<usize>| idx.and_then(|i| non_empty(row[i].text()));
        let debit = amount_at(cols.debit);
        let credit = amount_at(cols.credit);

        let tally_uid = format!(
            "T_{}_{}_{}_{}",
            heading.bank_code,
            hex_date(Some(date)),
            hex_amount(credit.or(debit)).unwrap_or_default(),
            row_tag(entries.len() + 1)
        );

        entries.push(TallyEntry {
            tally_uid,
            bank_code: heading.bank_code.clone(),
            acct_no: heading.acct_no.clone(),
            unit_name: heading.unit_name.clone(),
            statement_month: heading.statement_month.clone(),
            statement_year: heading.statement_year.clone(),
            date: Some(date),
            dr_cr: non_empty(row[cols.dr_cr].text()),
            tally_ven: Some(tally_vendor(&particulars)),
            particulars: non_empty(particulars),
            vch_type: text_at(cols.vch_type),
            vch_no: text_at(cols.vch_no),
            debit,
            credit,
        });
    }

    Ok(entries)
}

fn read_heading(grid: &Grid, header_row: usize) -> Result<Heading, ParseError> {
    let lines: Vec<String> = (0..header_row).map(|r| grid.text(r, 0)).collect();

    let acct_no = lines
        .iter()
        .filter(|line| !line.to_lowercase().contains("unit"))
        .find_map(|line| ACCOUNT_RE.find_iter(line).last())
        .map(|m| m.as_str().replace('-', ""))
        .unwrap_or_default();

    let bank_code = lines
        .iter()
        .find_map(|line| {
            let lower = line.to_lowercase();
            BANK_PATTERNS
                .iter()
                .find(|(_, names)| names.iter().any(|n| lower.contains(&n.to_lowercase())))
                .map(|(code, _)| code.to_string())
        })
        .unwrap_or_default();

    if bank_code.is_empty() || acct_no.is_empty() {
        return Err(ParseError::Metadata(
            "Unmapped bank account detected or account cell missing. \
             Check the bank name and account number in the ledger heading."
                .into(),
        ));
    }

    let (statement_month, statement_year) = lines
        .iter()
        .find_map(|line| PERIOD_RE.captures(line))
        .and_then(|caps| {
            let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%d-%b-%Y").ok();
            Some(period_labels(parse(&caps[1])?, parse(&caps[2])?))
        })
        .unwrap_or_default();

    let unit_name = lines
        .iter()
        .find_map(|line| UNIT_RE.captures(line).map(|c| c[1].trim().to_string()))
        .or_else(|| lines.first().cloned())
        .and_then(non_empty);

    Ok(Heading {
        bank_code,
        acct_no,
        unit_name,
        statement_month,
        statement_year,
    })
}

/// Column positions, with the first `Particulars` column read as the
/// `To`/`By` marker and the column after it as the ledger name.
fn voucher_columns(header: &[Cell]) -> Option<Columns> {
    let names: Vec<String> = header.iter().map(Cell::text).collect();
    let find = |label: &str| names.iter().position(|n| n == label);

    let dr_cr = find("Particulars")?;
    let particulars = dr_cr + 1;
    if particulars >= names.len() {
        return None;
    }
    let find_other = |label: &str| find(label).filter(|&i| i != particulars);

    Some(Columns {
        date: find("Date")?,
        dr_cr,
        particulars,
        vch_type: find_other("Vch Type"),
        vch_no: find_other("Vch No."),
        debit: find_other("Debit"),
        credit: find_other("Credit"),
    })
}

/// Fold narration continuation lines into the voucher row above them.
fn collapse_narrations(grid: &Grid, header_row: usize, cols: &Columns, width: usize) -> Vec<Vec<Cell>> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for r in (header_row + 1)..grid.height() {
        let mut row: Vec<Cell> = grid.row(r).iter().take(width).cloned().collect();
        row.resize(width, Cell::Empty);

        let continuation = row[cols.date].is_blank()
            && row[cols.dr_cr].is_blank()
            && !row[cols.particulars].is_blank();
        match rows.last_mut() {
            Some(current) if continuation => {
                let joined = format!(
                    "{}\n{}",
                    current[cols.particulars].text(),
                    row[cols.particulars].text()
                );
                current[cols.particulars] = Cell::Text(joined.trim().to_string());
            }
            _ => rows.push(row),
        }
    }
    rows
}

/// A trailing row holding only numbers is the ledger total.
fn is_totals_row(row: &[Cell]) -> bool {
    row.iter().all(|cell| {
        let text = cell.text();
        let stripped = text.replacen('.', "", 1).replacen(',', "", 1);
        text.is_empty() || (!stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Normalize a Particulars cell to `heading\ndetails`.
pub fn format_particulars(value: &str) -> String {
    let normalized = value.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    match lines.as_slice() {
        [] => String::new(),
        [single] => match HEADING_RE.captures(single) {
            Some(caps) => format!("{}\n{}", caps[1].trim(), caps[2].trim()),
            None => single.to_string(),
        },
        [first, rest @ ..] => format!("{first}\n{}", rest.join(" ").trim()),
    }
}

/// Vendor key from formatted Particulars.
pub fn tally_vendor(particulars: &str) -> String {
    let lines: Vec<&str> = particulars
        .trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if let [first, details, ..] = lines.as_slice() {
        if first.to_lowercase().replace(' ', "") == "(asperdetails)" {
            return vendor_from_details(details);
        }
    }

    let first = lines.first().copied().unwrap_or("");
    let value = ADVANCE_RE.replace(first, "");
    let value = MS_RE.replace(&value, "").into_owned();
    let value = ID_SPLIT_RE.split(&value).next().unwrap_or("").to_string();
    let value = AND_RE.replace_all(&value, "");
    PUNCT_RE.replace_all(&value, "").to_uppercase()
}

fn vendor_from_details(value: &str) -> String {
    let squash = |s: &str| s.trim().to_uppercase().replace(' ', "");

    if let Some(caps) = CE_CODE_RE.captures(value) {
        return squash(&caps[1]);
    }
    if let Some(caps) = PAYABLE_RE.captures(value) {
        return squash(&caps[1]);
    }
    if let Some(caps) = COMPANY_RE.captures(value) {
        return squash(&caps[1]);
    }
    if let Some((prefix, _)) = value.split_once("Amount") {
        if let Some(last) = prefix.split('-').map(str::trim).filter(|c| !c.is_empty()).last() {
            return last
                .to_uppercase()
                .chars()
                .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
                .collect();
        }
    }
    squash(value)
}
