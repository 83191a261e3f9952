// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Helpers shared by the statement and ledger parsers.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::money::round2;
use crate::time_utils::month_name;

/// Tried in order. Slash dates are month first, as spreadsheet exports write them.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d-%m-%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a free-form date cell.
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
}

/// Parse an amount cell: thousands separators are dropped and the value is rounded to 2 places.
pub fn parse_amount_text(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().and_then(round2)
}

/// Convert an Excel serial day number (1900 date system) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Lower-case hex of `YYYYMMDD`, or `"0"` when there is no date.
pub fn hex_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{:x}", yyyymmdd(d)),
        None => "0".to_string(),
    }
}

/// Upper-case hex of `YYYYMMDD`.
pub fn hex_date_upper(date: NaiveDate) -> String {
    format!("{:X}", yyyymmdd(date))
}

fn yyyymmdd(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Signed lower-case hex of an amount rounded to a whole number (ties to even).
pub fn hex_amount(amount: Option<f64>) -> Option<String> {
    let value = amount.filter(|a| a.is_finite())?.round_ties_even() as i64;
    Some(signed_hex(value))
}

pub fn signed_hex(value: i64) -> String {
    if value < 0 {
        format!("-{:x}", value.unsigned_abs())
    } else {
        format!("{value:x}")
    }
}

/// Zero-padded six digit row number used as the uid suffix.
pub fn row_tag(row_number: usize) -> String {
    format!("{row_number:06}")
}

/// Statement month/year from a period: the month name when both ends share a
/// month, the year when both ends share a year.
pub fn period_labels(first: NaiveDate, last: NaiveDate) -> (Option<String>, Option<String>) {
    let month = (first.month() == last.month())
        .then(|| month_name(first.month()).map(str::to_string))
        .flatten();
    let year = (first.year() == last.year()).then(|| first.year().to_string());
    (month, year)
}

/// `Some(text)` for non-blank text.
pub fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_text_formats() {
        assert_eq!(parse_date_text("2025-02-03"), Some(d(2025, 2, 3)));
        assert_eq!(parse_date_text("03-Feb-2025"), Some(d(2025, 2, 3)));
        assert_eq!(parse_date_text("3-Feb-25"), Some(d(2025, 2, 3)));
        assert_eq!(parse_date_text("03-02-2025"), Some(d(2025, 2, 3)));
        assert_eq!(parse_date_text("2025-02-03 00:00:00"), Some(d(2025, 2, 3)));
        // Slash dates are month first unless that cannot be a date.
        assert_eq!(parse_date_text("03/02/2025"), Some(d(2025, 3, 2)));
        assert_eq!(parse_date_text("25/02/2025"), Some(d(2025, 2, 25)));
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_parse_amount_text() {
        assert_eq!(parse_amount_text("1,50,000.00"), Some(150000.0));
        assert_eq!(parse_amount_text(" 12.345 "), Some(12.34));
        assert_eq!(parse_amount_text(""), None);
        assert_eq!(parse_amount_text("n/a"), None);
    }

    #[test]
    fn test_excel_serial() {
        let dt = excel_serial_to_datetime(45691.5).unwrap();
        assert_eq!(dt.date(), d(2025, 2, 3));
        assert_eq!(dt.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(hex_date(Some(d(2025, 2, 1))), format!("{:x}", 20250201));
        assert_eq!(hex_date(None), "0");
        assert_eq!(hex_date_upper(d(2025, 2, 1)), format!("{:X}", 20250201));
        assert_eq!(hex_amount(Some(255.4)), Some("ff".to_string()));
        assert_eq!(hex_amount(Some(2.5)), Some("2".to_string()));
        assert_eq!(hex_amount(Some(-31.0)), Some("-1f".to_string()));
        assert_eq!(hex_amount(None), None);
        assert_eq!(row_tag(7), "000007");
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(
            period_labels(d(2025, 2, 1), d(2025, 2, 28)),
            (Some("February".to_string()), Some("2025".to_string()))
        );
        assert_eq!(
            period_labels(d(2025, 1, 15), d(2025, 2, 14)),
            (None, Some("2025".to_string()))
        );
    }
}
