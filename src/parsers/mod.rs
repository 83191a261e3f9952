// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spreadsheet parsers for bank statements, finance paid lists and Tally ledgers.
//!
//! Workbooks are read fully in memory with `calamine` into a [`Grid`]: a
//! table of cells addressed by absolute sheet coordinates, so fixed metadata
//! cells (account number, statement period) can be looked up by position.

pub mod common;
pub mod finance;
pub mod mdb;
pub mod mtb;
pub mod pbl;
pub mod tally;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Cursor;

use crate::models::BankEntry;

pub use common::{parse_amount_text, parse_date_text};

/// Errors raised while reading or interpreting a workbook.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no sheets")]
    EmptyWorkbook,

    #[error("Sheet '{0}' not found.")]
    SheetNotFound(String),

    #[error("{0}")]
    HeaderNotFound(String),

    #[error("{0}")]
    Metadata(String),

    #[error("{0}")]
    AccountNotAllowed(String),
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Trimmed display text, the way the cell would read when exported as text.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Date(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Date value of the cell, parsing text when needed.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(dt) => Some(dt.date()),
            Cell::Text(s) => parse_date_text(s),
            Cell::Number(_) | Cell::Empty => None,
        }
    }

    /// Date value, reading text with one explicit `chrono` format only.
    pub fn as_date_with_format(&self, format: &str) -> Option<NaiveDate> {
        match self {
            Cell::Date(dt) => Some(dt.date()),
            Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), format).ok(),
            Cell::Number(_) | Cell::Empty => None,
        }
    }

    /// Amount value of the cell, rounded to two places.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => crate::money::round2(*n),
            Cell::Text(s) => parse_amount_text(s),
            Cell::Date(_) | Cell::Empty => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Rectangular view of one worksheet, indexed by absolute (row, column).
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid of text cells; blank strings become [`Cell::Empty`].
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|s| {
                        let s = s.as_ref();
                        if s.trim().is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(s.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    fn from_range(range: &Range<Data>) -> Self {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; start_col as usize];
            cells.extend(row.iter().map(cell_from_data));
            rows.push(cells);
        }
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, row: usize, col: usize) -> String {
        self.get(row, col).text()
    }

    /// First row whose trimmed cell texts contain every label in `labels`.
    pub fn find_header_row(&self, labels: &[&str], case_insensitive: bool) -> Option<usize> {
        self.rows.iter().position(|row| {
            let texts: Vec<String> = row
                .iter()
                .map(|c| {
                    let t = c.text();
                    if case_insensitive {
                        t.to_lowercase()
                    } else {
                        t
                    }
                })
                .collect();
            labels.iter().all(|label| {
                let label = if case_insensitive {
                    label.to_lowercase()
                } else {
                    label.to_string()
                };
                texts.iter().any(|t| *t == label)
            })
        })
    }

    /// Column index of each label within a header row (exact, trimmed match).
    pub fn column_indices(
        &self,
        header_row: usize,
        labels: &[&str],
        case_insensitive: bool,
    ) -> Option<Vec<usize>> {
        let row = self.row(header_row);
        labels
            .iter()
            .map(|label| {
                row.iter().position(|c| {
                    let t = c.text();
                    if case_insensitive {
                        t.eq_ignore_ascii_case(label)
                    } else {
                        t == *label
                    }
                })
            })
            .collect()
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            common::excel_serial_to_datetime(serial)
                .map(Cell::Date)
                .unwrap_or(Cell::Number(serial))
        }
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Cell::Date)
            .unwrap_or_else(|_| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Statement layouts accepted by `/parse_bank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementBank {
    Mdb,
    Mtb,
    Pbl,
}

impl StatementBank {
    /// Resolve a bank code from the upload form.
    ///
    /// Known banks without a parser and unknown codes are rejected with
    /// the message shown to the user.
    pub fn from_code(code: &str) -> Result<Self, String> {
        match code {
            mdb::BANK_CODE => Ok(Self::Mdb),
            mtb::BANK_CODE => Ok(Self::Mtb),
            pbl::BANK_CODE => Ok(Self::Pbl),
            "EBL" => Err(not_implemented("Eastern Bank", code)),
            "OBL" => Err(not_implemented("One Bank", code)),
            "IBBL" => Err(not_implemented("Islami Bank", code)),
            _ => Err("Selected bank is not recognized.".to_string()),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Mdb => mdb::BANK_CODE,
            Self::Mtb => mtb::BANK_CODE,
            Self::Pbl => pbl::BANK_CODE,
        }
    }

    /// File extension the bank's statement export uses.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mdb | Self::Pbl => ".xlsx",
            Self::Mtb => ".xls",
        }
    }

    /// Worksheet read when the upload names none.
    pub fn default_sheet(self) -> Option<&'static str> {
        match self {
            Self::Mtb => Some(mtb::SHEET_NAME),
            Self::Mdb | Self::Pbl => None,
        }
    }

    pub fn parse(self, grid: &Grid) -> Result<Vec<BankEntry>, ParseError> {
        match self {
            Self::Mdb => mdb::parse(grid),
            Self::Mtb => mtb::parse(grid),
            Self::Pbl => pbl::parse(grid),
        }
    }
}

fn not_implemented(name: &str, code: &str) -> String {
    format!("Parsing for {name} ({code}) is not implemented yet.")
}

/// Read one worksheet of an `.xls`/`.xlsx` workbook held in memory.
///
/// With no `sheet` the first sheet is used.
pub fn read_sheet(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Grid, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ParseError::SheetNotFound(wanted.to_string()))?,
        None => names.first().cloned().ok_or(ParseError::EmptyWorkbook)?,
    };
    let range = workbook.worksheet_range(&name)?;
    Ok(Grid::from_range(&range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_formats_whole_numbers_without_fraction() {
        assert_eq!(Cell::Number(1234.0).text(), "1234");
        assert_eq!(Cell::Number(12.5).text(), "12.5");
        assert_eq!(Cell::Text("  a b ".into()).text(), "a b");
        assert_eq!(Cell::Empty.text(), "");
    }

    #[test]
    fn test_statement_bank_from_code() {
        assert_eq!(StatementBank::from_code("MTB"), Ok(StatementBank::Mtb));
        assert_eq!(StatementBank::Mtb.extension(), ".xls");
        assert_eq!(StatementBank::Mtb.default_sheet(), Some("AcStatementReport"));
        assert_eq!(
            StatementBank::from_code("EBL"),
            Err("Parsing for Eastern Bank (EBL) is not implemented yet.".to_string())
        );
        assert_eq!(
            StatementBank::from_code("XYZ"),
            Err("Selected bank is not recognized.".to_string())
        );
    }

    #[test]
    fn test_grid_out_of_range_is_empty() {
        let grid = Grid::from_strings([["a", "b"]]);
        assert_eq!(grid.text(0, 1), "b");
        assert_eq!(grid.text(5, 5), "");
        assert!(grid.get(0, 9).is_blank());
    }

    #[test]
    fn test_find_header_row() {
        let grid = Grid::from_strings([
            vec!["Report", "", ""],
            vec!["DATE", "Amount", "x"],
            vec!["Date", "Amount", "Balance"],
        ]);
        assert_eq!(grid.find_header_row(&["Date", "Amount"], false), Some(2));
        assert_eq!(grid.find_header_row(&["date", "amount"], true), Some(1));
        assert_eq!(grid.find_header_row(&["Missing"], true), None);
        assert_eq!(
            grid.column_indices(2, &["Balance", "Date"], false),
            Some(vec![2, 0])
        );
    }

    #[test]
    fn test_cell_amount_and_date() {
        assert_eq!(Cell::Text("1,234.567".into()).as_amount(), Some(1234.57));
        assert_eq!(Cell::Number(99.999).as_amount(), Some(100.0));
        assert_eq!(
            Cell::Text("05-02-2025".into()).as_date_with_format("%d-%m-%Y"),
            NaiveDate::from_ymd_opt(2025, 2, 5)
        );
    }
}
