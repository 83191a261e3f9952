// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Excel export of report rows.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::{Map, Value};

/// MIME type of an `.xlsx` attachment.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Render `rows` as a single-sheet workbook with a bold header row.
pub fn rows_to_xlsx(columns: &[&str], rows: &[Map<String, Value>]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (c, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col(c), *name, &header)?;
    }
    for (r, row) in rows.iter().enumerate() {
        let r = u32::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (c, name) in columns.iter().enumerate() {
            if let Some(value) = row.get(*name) {
                write_cell(sheet, r, col(c), value)?;
            }
        }
    }
    sheet.autofit();

    workbook.save_to_buffer()
}

fn col(c: usize) -> u16 {
    u16::try_from(c).unwrap_or(u16::MAX)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                sheet.write_number(row, col, f)?;
            }
        }
        Value::String(s) if s.is_empty() => {}
        Value::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        Value::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        other => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_to_xlsx_produces_zip() {
        let row: Map<String, Value> = serde_json::from_value(json!({
            "S/N": 1,
            "bank_uid": "B1",
            "B_Withdrawal": 125.5,
            "bank_ven": null
        }))
        .unwrap();
        let bytes = rows_to_xlsx(&["S/N", "bank_uid", "B_Withdrawal", "bank_ven"], &[row]).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }
}
